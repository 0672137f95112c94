pub mod github;
pub mod traits;

pub use github::{GitHubGateway, GITHUB_API_BASE};
pub use traits::{create_gateway, Credential, Gateway, Identity, ImageUpload};
