//! "Get in Touch": hand a `tel:` link to the desktop so the user can call
//! Glen directly. Independent of the conversation; nothing here reads or
//! writes session state.

use std::io;
use std::process::{Command, Stdio};

/// Opens a URI at the top level (the desktop's default handler)
pub trait Launcher {
    fn launch(&self, uri: &str) -> io::Result<()>;
}

impl<L: Launcher + ?Sized> Launcher for Box<L> {
    fn launch(&self, uri: &str) -> io::Result<()> {
        (**self).launch(uri)
    }
}

/// Uses the platform URL opener
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLauncher;

impl Launcher for SystemLauncher {
    fn launch(&self, uri: &str) -> io::Result<()> {
        let mut command = if cfg!(target_os = "macos") {
            let mut c = Command::new("open");
            c.arg(uri);
            c
        } else if cfg!(target_os = "windows") {
            let mut c = Command::new("cmd");
            c.args(["/C", "start", "", uri]);
            c
        } else {
            let mut c = Command::new("xdg-open");
            c.arg(uri);
            c
        };

        let status = command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()?;

        if status.success() {
            Ok(())
        } else {
            Err(io::Error::new(
                io::ErrorKind::Other,
                format!("opener exited with {}", status),
            ))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialOutcome {
    /// The desktop took the `tel:` link
    Launched(String),
    /// No top-level handler; the caller shows the link itself
    InContext(String),
}

impl DialOutcome {
    pub fn uri(&self) -> &str {
        match self {
            DialOutcome::Launched(uri) | DialOutcome::InContext(uri) => uri,
        }
    }
}

pub struct EscapeHatch<L: Launcher = SystemLauncher> {
    number: String,
    launcher: L,
}

impl EscapeHatch<SystemLauncher> {
    pub fn new(number: &str) -> Self {
        Self::with_launcher(number, SystemLauncher)
    }
}

impl<L: Launcher> EscapeHatch<L> {
    pub fn with_launcher(number: &str, launcher: L) -> Self {
        Self {
            number: number.to_string(),
            launcher,
        }
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn tel_uri(&self) -> String {
        let digits: String = self
            .number
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '+')
            .collect();
        format!("tel:{}", digits)
    }

    /// Fire the dial intent. Falls back to the current context rather
    /// than failing when nothing at the top level can take the link.
    pub fn dial(&self) -> DialOutcome {
        let uri = self.tel_uri();
        match self.launcher.launch(&uri) {
            Ok(()) => {
                tracing::info!(%uri, "dial handed to system opener");
                DialOutcome::Launched(uri)
            }
            Err(e) => {
                tracing::info!(%uri, error = %e, "no system opener; dialing in context");
                DialOutcome::InContext(uri)
            }
        }
    }
}
