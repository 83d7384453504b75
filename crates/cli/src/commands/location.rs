//! Delivery location commands.

use clap::Subcommand;
use raiz_storefront::error::AppError;
use raiz_storefront::state::AppState;

use super::say;

/// `raiz location` subcommands.
#[derive(Debug, Subcommand)]
pub enum LocationAction {
    /// Look up a CEP and save it as the delivery location
    Set {
        /// CEP, with or without the hyphen (e.g., `01001-000`)
        postal_code: String,
    },
    /// Show the saved delivery location
    Show,
    /// Forget the saved delivery location
    Clear,
}

/// Run a location subcommand.
pub async fn run(state: &AppState, action: LocationAction) -> Result<(), AppError> {
    match action {
        LocationAction::Set { postal_code } => {
            let location = state.location().locate(&postal_code).await?;
            say(format!(
                "Entrega em {} ({})",
                location.locality.label(),
                location.locality.postal_code
            ));
        }
        LocationAction::Show => match state.location().saved() {
            Some(location) => say(format!(
                "Entrega em {} ({})",
                location.locality.label(),
                location.locality.postal_code
            )),
            None => say("Nenhum CEP informado."),
        },
        LocationAction::Clear => {
            state.location().forget();
            say("CEP removido.");
        }
    }
    Ok(())
}
