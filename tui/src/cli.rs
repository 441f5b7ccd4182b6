use clap::Parser;

/// Terminal client for the chat hub
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct ClientArgs {
    /// Host and port of the chat hub, prefilled on the connect page.
    #[arg(long, default_value = "localhost:8080")]
    pub server: String,

    /// Display name to prefill when joining the room.
    #[arg(long)]
    pub name: Option<String>,
}
