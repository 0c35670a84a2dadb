//! Initial schema.
//!
//! - `users`: identity records
//! - `user_status`: employment status lookup
//! - `user_department`: organizational unit lookup
//! - `user_profile`: personnel data, one row per identity

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Username,
    Email,
    IsActive,
    DateJoined,
}

#[derive(Iden)]
enum UserStatus {
    Table,
    Id,
    Status,
    Title,
    Description,
}

#[derive(Iden)]
enum UserDepartment {
    Table,
    Id,
    Title,
    Block,
    Department,
    Group,
    Branch,
    Description,
}

#[derive(Iden)]
enum UserProfile {
    Table,
    Id,
    UserId,
    StatusId,
    DepartmentId,
    Avatar,
    LastName,
    FirstName,
    MiddleName,
    MobilePhone,
    Phone,
    Description,
    ExperienceStart,
    ExperienceNow,
    ExperienceDescription,
    Post,
    CreatedTime,
    UpdatedTime,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Username)
                            .string_len(150)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::Email).string_len(254))
                    .col(
                        ColumnDef::new(Users::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Users::DateJoined)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Statuses
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(UserStatus::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserStatus::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(UserStatus::Status)
                            .string_len(50)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(UserStatus::Title).string_len(50).not_null())
                    .col(ColumnDef::new(UserStatus::Description).string_len(250))
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Departments
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(UserDepartment::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserDepartment::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(UserDepartment::Title)
                            .string_len(150)
                            .not_null(),
                    )
                    .col(ColumnDef::new(UserDepartment::Block).string_len(250))
                    .col(ColumnDef::new(UserDepartment::Department).string_len(250))
                    .col(ColumnDef::new(UserDepartment::Group).string_len(250))
                    .col(ColumnDef::new(UserDepartment::Branch).string_len(250))
                    .col(ColumnDef::new(UserDepartment::Description).string_len(150))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-user_department-group")
                    .table(UserDepartment::Table)
                    .col(UserDepartment::Group)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-user_department-branch")
                    .table(UserDepartment::Table)
                    .col(UserDepartment::Branch)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Profiles
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(UserProfile::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserProfile::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(UserProfile::UserId)
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(UserProfile::StatusId).big_integer())
                    .col(ColumnDef::new(UserProfile::DepartmentId).big_integer())
                    .col(
                        ColumnDef::new(UserProfile::Avatar)
                            .string_len(100)
                            .not_null()
                            .default("system/user-dummy-img.jpg"),
                    )
                    .col(ColumnDef::new(UserProfile::LastName).string_len(50))
                    .col(ColumnDef::new(UserProfile::FirstName).string_len(50))
                    .col(ColumnDef::new(UserProfile::MiddleName).string_len(50))
                    .col(ColumnDef::new(UserProfile::MobilePhone).string_len(128))
                    .col(ColumnDef::new(UserProfile::Phone).string_len(128))
                    .col(ColumnDef::new(UserProfile::Description).text())
                    .col(ColumnDef::new(UserProfile::ExperienceStart).date())
                    .col(ColumnDef::new(UserProfile::ExperienceNow).date())
                    .col(ColumnDef::new(UserProfile::ExperienceDescription).text())
                    .col(ColumnDef::new(UserProfile::Post).string_len(150))
                    .col(
                        ColumnDef::new(UserProfile::CreatedTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserProfile::UpdatedTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-user_profile-user_id")
                            .from(UserProfile::Table, UserProfile::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-user_profile-status_id")
                            .from(UserProfile::Table, UserProfile::StatusId)
                            .to(UserStatus::Table, UserStatus::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-user_profile-department_id")
                            .from(UserProfile::Table, UserProfile::DepartmentId)
                            .to(UserDepartment::Table, UserDepartment::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-user_profile-user_id-last_name-unique")
                    .table(UserProfile::Table)
                    .col(UserProfile::UserId)
                    .col(UserProfile::LastName)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-user_profile-user_id-id-unique")
                    .table(UserProfile::Table)
                    .col(UserProfile::UserId)
                    .col(UserProfile::Id)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-user_profile-last_name-first_name")
                    .table(UserProfile::Table)
                    .col(UserProfile::LastName)
                    .col(UserProfile::FirstName)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-user_profile-status_id")
                    .table(UserProfile::Table)
                    .col(UserProfile::StatusId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-user_profile-department_id")
                    .table(UserProfile::Table)
                    .col(UserProfile::DepartmentId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order (respecting foreign keys)
        manager
            .drop_table(Table::drop().table(UserProfile::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserDepartment::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserStatus::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        Ok(())
    }
}
