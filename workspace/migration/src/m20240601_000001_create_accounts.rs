use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create users table (developer accounts)
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_auto(Users::Id))
                    .col(string(Users::Name))
                    .col(string(Users::Email).unique_key())
                    .col(string(Users::Password))
                    .col(string_len(Users::Role, 20))
                    .col(string(Users::ProfilePicture).default(""))
                    .col(string(Users::Bio).default(""))
                    .col(json(Users::Skills))
                    .col(json(Users::Experience))
                    .col(json(Users::Education))
                    .col(string(Users::ResumeUrl).default(""))
                    .col(json(Users::LookingFor))
                    .col(string(Users::Location).default(""))
                    .col(boolean(Users::Remote).default(false))
                    .col(timestamp_with_time_zone(Users::CreatedAt))
                    .col(timestamp_with_time_zone(Users::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        // Create companies table
        manager
            .create_table(
                Table::create()
                    .table(Companies::Table)
                    .if_not_exists()
                    .col(pk_auto(Companies::Id))
                    .col(string(Companies::Name))
                    .col(string(Companies::Email).unique_key())
                    .col(string(Companies::Password))
                    .col(string(Companies::Logo).default(""))
                    .col(string(Companies::Description).default(""))
                    .col(string(Companies::Industry).default(""))
                    .col(string(Companies::Location).default(""))
                    .col(string(Companies::Website).default(""))
                    .col(string_len(Companies::Size, 10).default("1-10"))
                    .col(integer_null(Companies::Founded))
                    .col(timestamp_with_time_zone(Companies::CreatedAt))
                    .col(timestamp_with_time_zone(Companies::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        // Create connection_requests table. Rows belong to the target user;
        // the requester is a plain reference.
        manager
            .create_table(
                Table::create()
                    .table(ConnectionRequests::Table)
                    .if_not_exists()
                    .col(pk_auto(ConnectionRequests::Id))
                    .col(integer(ConnectionRequests::UserId))
                    .col(integer(ConnectionRequests::FromUserId))
                    .col(string_len(ConnectionRequests::Status, 10).default("pending"))
                    .col(timestamp_with_time_zone(ConnectionRequests::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_connection_request_target")
                            .from(ConnectionRequests::Table, ConnectionRequests::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_connection_requests_target_from")
                    .table(ConnectionRequests::Table)
                    .col(ConnectionRequests::UserId)
                    .col(ConnectionRequests::FromUserId)
                    .to_owned(),
            )
            .await?;

        // At most one pending request per requester and target
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS idx_connection_requests_one_pending \
                 ON connection_requests (user_id, from_user_id) WHERE status = 'pending'",
            )
            .await?;

        // Create user_connections table (one row per directed edge)
        manager
            .create_table(
                Table::create()
                    .table(UserConnections::Table)
                    .if_not_exists()
                    .col(integer(UserConnections::UserId))
                    .col(integer(UserConnections::ConnectedUserId))
                    .primary_key(
                        Index::create()
                            .name("pk_user_connections")
                            .col(UserConnections::UserId)
                            .col(UserConnections::ConnectedUserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_connections_user")
                            .from(UserConnections::Table, UserConnections::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserConnections::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ConnectionRequests::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Companies::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Name,
    Email,
    Password,
    Role,
    ProfilePicture,
    Bio,
    Skills,
    Experience,
    Education,
    ResumeUrl,
    LookingFor,
    Location,
    Remote,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Companies {
    Table,
    Id,
    Name,
    Email,
    Password,
    Logo,
    Description,
    Industry,
    Location,
    Website,
    Size,
    Founded,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ConnectionRequests {
    Table,
    Id,
    UserId,
    FromUserId,
    Status,
    CreatedAt,
}

#[derive(DeriveIden)]
enum UserConnections {
    Table,
    UserId,
    ConnectedUserId,
}
