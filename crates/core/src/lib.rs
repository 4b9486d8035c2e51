pub mod auth;
pub mod backend;
pub mod config;
pub mod metrics;
pub mod testing;
pub mod ticket;

pub use auth::{
    create_authenticator, AdminAuthenticator, AdminGrant, AuthError, AuthRequest, Authenticator,
    Identity, NoneAuthenticator,
};
pub use backend::{
    create_backend, ContentId, HostedFileBackend, LocalFileBackend, PersistError,
    PersistenceBackend, Precondition,
};
pub use config::{
    load_config, load_config_from_str, validate_config, AuthConfig, AuthMethod, Config,
    ConfigError, SanitizedConfig, StorageBackend,
};
pub use ticket::{
    RequiredField, TicketError, TicketPatch, TicketRecord, TicketStats, TicketStatus,
    TicketStore, TicketSubmission, TicketTable, UpdateOutcome,
};
