use crate::bigquery::client::AUTH_SCOPE;
use crate::error::{AppError, Result};
use hyper_util::client::legacy::connect::HttpConnector;
use tracing::debug;
use yup_oauth2::{
    ApplicationDefaultCredentialsAuthenticator, ApplicationDefaultCredentialsFlowOpts,
    authenticator::{ApplicationDefaultCredentialsTypes, Authenticator},
    hyper_rustls::HttpsConnector,
};

type AuthType = Authenticator<HttpsConnector<HttpConnector>>;

/// Create and verify authenticator by fetching a token
///
/// Credentials are resolved the Application Default Credentials way: a service account
/// key named by `GOOGLE_APPLICATION_CREDENTIALS`, else the GCE metadata server.
pub(super) async fn create_and_verify_authenticator() -> Result<AuthType> {
    let opts = ApplicationDefaultCredentialsFlowOpts::default();
    let auth = match ApplicationDefaultCredentialsAuthenticator::builder(opts).await {
        ApplicationDefaultCredentialsTypes::ServiceAccount(builder) => {
            debug!("Using service account credentials");
            builder.build().await
        }
        ApplicationDefaultCredentialsTypes::InstanceMetadata(builder) => {
            debug!("Using instance metadata credentials");
            builder.build().await
        }
    }
    .map_err(|e| AppError::Auth(format!("Failed to build authenticator: {}", e)))?;

    // Trigger authentication by requesting a token
    let _token = auth
        .token(&[AUTH_SCOPE])
        .await
        .map_err(|e| AppError::Auth(format!("Failed to get token: {}", e)))?;

    Ok(auth)
}
