mod session;

pub use session::TokenEndpoint;
pub use session::TokenManager;
