use tracing::{debug, info, warn};

use crate::client::ProviderApi;
use crate::error::{ReportError, Result};

/// Phone number used when neither the extension nor the account has one.
pub const UNKNOWN_PHONE: &str = "Unknown";

/// Resolve the phone number of `extension_id`.
///
/// Fails with [`ReportError::NotFound`] when the id is not in the account's
/// extension list. An extension without a direct number falls back to the
/// account main number, then to [`UNKNOWN_PHONE`].
pub async fn resolve_extension_phone<A>(api: &A, extension_id: &str) -> Result<String>
where
    A: ProviderApi + ?Sized,
{
    let extensions = api.list_extensions().await?;
    debug!(count = extensions.len(), "Fetched extension list");

    let extension = extensions
        .iter()
        .find(|ext| ext.id == extension_id)
        .ok_or_else(|| ReportError::NotFound(extension_id.to_string()))?;
    info!(
        extension_id,
        extension_number = extension.extension_number.as_deref().unwrap_or_default(),
        name = extension.name.as_deref().unwrap_or_default(),
        "Extension found"
    );

    if let Some(phone) = extension.phone_number() {
        info!(phone, "Extension phone number");
        return Ok(phone.to_string());
    }

    let account = api.get_account().await?;
    let phone = account
        .main_number
        .filter(|number| !number.is_empty())
        .unwrap_or_else(|| {
            warn!(extension_id, "No extension or account number available");
            UNKNOWN_PHONE.to_string()
        });
    info!(phone = %phone, "Extension phone number (account fallback)");
    Ok(phone)
}
