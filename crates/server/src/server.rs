use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, put},
};
use axum_extra::{TypedHeader, headers::Host};
use chrono_tz::Tz;
use engine::{Engine, MediaStore};

use std::sync::Arc;

use crate::{departments, media, profiles, site, statuses, users};

const LOCAL_HOSTS: [&str; 4] = ["localhost", "127.0.0.1", "::1", "[::1]"];

/// Site-wide settings the admin API renders with.
#[derive(Clone, Debug)]
pub struct SiteSettings {
    pub app_name: String,
    pub language_code: String,
    pub time_zone: Tz,
    pub allowed_hosts: Vec<String>,
    pub debug: bool,
}

impl SiteSettings {
    /// Whether requests addressed to `host` are served.
    ///
    /// `*` matches everything and an entry starting with `.` matches the
    /// domain and all of its subdomains. With no entries, debug mode serves
    /// local names only.
    pub fn host_allowed(&self, host: &str) -> bool {
        let host = host.trim_end_matches('.').to_ascii_lowercase();
        if self.allowed_hosts.is_empty() {
            return self.debug && LOCAL_HOSTS.contains(&host.as_str());
        }
        self.allowed_hosts.iter().any(|pattern| {
            let pattern = pattern.to_ascii_lowercase();
            if pattern == "*" {
                return true;
            }
            match pattern.strip_prefix('.') {
                Some(domain) => host == domain || host.ends_with(&pattern),
                None => host == pattern,
            }
        })
    }
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            app_name: "Staffbook".to_string(),
            language_code: "en-us".to_string(),
            time_zone: Tz::UTC,
            allowed_hosts: Vec::new(),
            debug: false,
        }
    }
}

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub media: MediaStore,
    pub site: Arc<SiteSettings>,
}

async fn allowed_hosts(
    host: Option<TypedHeader<Host>>,
    State(state): State<ServerState>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(TypedHeader(host)) = host else {
        tracing::warn!("rejected request without Host header");
        return Err(StatusCode::BAD_REQUEST);
    };
    if !state.site.host_allowed(host.hostname()) {
        tracing::warn!("rejected request for disallowed host {}", host.hostname());
        return Err(StatusCode::BAD_REQUEST);
    }
    Ok(next.run(request).await)
}

pub fn router(state: ServerState) -> Router {
    let mut router = Router::new()
        .route("/admin", get(site::index))
        .route(
            "/admin/statuses",
            get(statuses::list).post(statuses::create),
        )
        .route(
            "/admin/statuses/{id}",
            get(statuses::get)
                .put(statuses::update)
                .delete(statuses::delete),
        )
        .route(
            "/admin/departments",
            get(departments::list).post(departments::create),
        )
        .route(
            "/admin/departments/{id}",
            get(departments::get)
                .put(departments::update)
                .delete(departments::delete),
        )
        .route("/admin/profiles", get(profiles::list))
        .route("/admin/profiles/export", get(profiles::export))
        .route(
            "/admin/profiles/{id}",
            get(profiles::get)
                .put(profiles::update)
                .patch(profiles::inline_update),
        )
        .route("/admin/profiles/{id}/avatar", put(profiles::upload_avatar))
        .route("/admin/users", get(users::list).post(users::create))
        .route(
            "/admin/users/{id}",
            get(users::get).put(users::update).delete(users::delete),
        );

    if state.site.debug {
        router = router.route("/media/{*path}", get(media::serve));
    }

    router
        .route_layer(middleware::from_fn_with_state(state.clone(), allowed_hosts))
        .with_state(state)
}

pub async fn run_with_listener(
    engine: Engine,
    site: SiteSettings,
    media: MediaStore,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("{} admin listening on {}", site.app_name, addr);
    if site.debug {
        tracing::warn!("debug mode is on, media files are served by the admin");
    }

    let state = ServerState {
        engine: Arc::new(engine),
        media,
        site: Arc::new(site),
    };

    axum::serve(listener, router(state)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(hosts: &[&str], debug: bool) -> SiteSettings {
        SiteSettings {
            allowed_hosts: hosts.iter().map(ToString::to_string).collect(),
            debug,
            ..Default::default()
        }
    }

    #[test]
    fn empty_host_list_allows_localhost_in_debug_only() {
        assert!(site(&[], true).host_allowed("localhost"));
        assert!(!site(&[], true).host_allowed("example.com"));
        assert!(!site(&[], false).host_allowed("localhost"));
    }

    #[test]
    fn wildcard_and_subdomain_patterns() {
        assert!(site(&["*"], false).host_allowed("anything.test"));
        let hosts = site(&[".example.com", "hr.local"], false);
        assert!(hosts.host_allowed("example.com"));
        assert!(hosts.host_allowed("Admin.Example.com"));
        assert!(hosts.host_allowed("hr.local"));
        assert!(!hosts.host_allowed("badexample.com"));
        assert!(!hosts.host_allowed("other.local"));
    }
}
