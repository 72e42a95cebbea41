//! SUT command
//!
//! Usage: ehrtest sut [--sut DEV|TEST] [--auth BASIC|OAUTH] [--no-docker]
//!
//! Unset flags fall back to the `SUT`, `AUTH_TYPE` and `NODOCKER`
//! environment variables.

use clap::Args;
use ehrtest_core::{AuthType, SutKind, SutSelection};

#[derive(Debug, Args)]
pub struct SutArgs {
    /// Target deployment (DEV, TEST)
    #[arg(long)]
    pub sut: Option<SutKind>,

    /// Authentication scheme (BASIC, OAUTH)
    #[arg(long)]
    pub auth: Option<AuthType>,

    /// Server runs outside of docker
    #[arg(long)]
    pub no_docker: bool,
}

/// Execute sut command
pub fn execute(args: SutArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut selection = SutSelection::from_env()?;
    if let Some(sut) = args.sut {
        selection.sut = sut;
    }
    if let Some(auth) = args.auth {
        selection.auth_type = auth;
    }
    selection.no_docker |= args.no_docker;

    let config = selection.select();
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
