//! CLI argument definitions for the provider publisher.
//!
//! The run takes no arguments: everything it needs comes from the
//! environment and built-in constants. The parser exists for `--help` and
//! `--version`.

use clap::Parser;

/// Publish a Terraform provider release to the private registry.
#[derive(Parser, Debug, Default)]
#[command(name = "provider-publisher")]
#[command(version, about)]
#[command(long_about = concat!(
    "Publish a Terraform provider release to the private registry.\n\n",
    "Downloads the release assets from GitHub into the current directory, ",
    "creates the provider version if the registry does not have it yet, then ",
    "registers and uploads every platform archive.",
))]
#[command(after_help = concat!(
    "ENVIRONMENT:\n",
    "  REF_NAME         Release version or tag (required)\n",
    "  TF_ADMIN_TOKEN   Registry API token (required)\n",
    "  GPG_KEY_ID       Signing key id registered with the registry (required)\n",
    "  RUST_LOG         Log filter [default: info]",
))]
pub struct Cli {}
