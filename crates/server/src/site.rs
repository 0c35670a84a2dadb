use api_types::admin::{EntityInfo, SiteInfo};
use axum::{Json, extract::State};
use engine::{AdminConfig, REGISTRY};

use crate::server::ServerState;

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

fn map_config(config: AdminConfig) -> EntityInfo {
    EntityInfo {
        name: config.name.to_string(),
        verbose_name: config.verbose_name.to_string(),
        verbose_name_plural: config.verbose_name_plural.to_string(),
        list_display: strings(config.list_display),
        list_display_links: strings(config.list_display_links),
        list_editable: strings(config.list_editable),
        search_fields: strings(config.search_fields),
        list_filter: strings(config.list_filter),
        ordering: strings(config.ordering),
        readonly_fields: strings(config.readonly_fields),
        empty_value_display: config.empty_value_display.to_string(),
    }
}

/// Admin index: site identity and every registered entity.
pub async fn index(State(state): State<ServerState>) -> Json<SiteInfo> {
    let site = &state.site;
    Json(SiteInfo {
        app_name: site.app_name.clone(),
        language_code: site.language_code.clone(),
        time_zone: site.time_zone.name().to_string(),
        entities: REGISTRY.into_iter().map(map_config).collect(),
    })
}
