use anyhow::{anyhow, Context, Result};
use auto_launch::AutoLaunchBuilder;
use tracing::info;

/// Fixed identifier used for the OS startup registration entry.
pub const APP_NAME: &str = "DesktopCountdown";

/// Registers or removes the login-launch entry for the running executable.
/// Callers treat failure as non-fatal; the widget keeps running either way.
pub fn sync(enabled: bool) -> Result<()> {
    let exe = std::env::current_exe().context("failed resolving executable path")?;
    let auto = AutoLaunchBuilder::new()
        .set_app_name(APP_NAME)
        .set_app_path(&exe.to_string_lossy())
        .build()
        .map_err(|err| anyhow!("failed building autostart entry: {err}"))?;

    if enabled {
        auto.enable()
            .map_err(|err| anyhow!("failed enabling autostart: {err}"))?;
        info!(path = %exe.display(), "registered login launch");
    } else {
        // Absence of an existing entry is not an error.
        if auto.is_enabled().unwrap_or(false) {
            auto.disable()
                .map_err(|err| anyhow!("failed disabling autostart: {err}"))?;
        }
        info!("removed login launch registration");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use auto_launch::AutoLaunchBuilder;

    use super::APP_NAME;

    #[test]
    fn builder_accepts_fixed_app_name() {
        let exe = std::env::current_exe().expect("test executable path");
        let auto = AutoLaunchBuilder::new()
            .set_app_name(APP_NAME)
            .set_app_path(&exe.to_string_lossy())
            .build();
        assert!(auto.is_ok());
    }
}
