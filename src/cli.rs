use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "gmailbox", version, about = "Read, send and reply to Gmail messages")]
pub struct Cli {
    #[arg(
        long,
        global = true,
        default_value = "default",
        help = "Profile name to use"
    )]
    pub profile: String,
    #[arg(long, global = true, help = "Emit JSON output")]
    pub json: bool,
    #[arg(short = 'v', long, global = true, action = ArgAction::Count, help = "Verbose logging (repeatable)")]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    List(ListArgs),
    Get(GetArgs),
    Send(SendArgs),
    Attachments(AttachmentsArgs),
    Label(LabelArgs),
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(long, help = "Maximum messages per page [default: profile page_size]")]
    pub limit: Option<u32>,
    #[arg(long, help = "Restrict to inbox messages")]
    pub inbox: bool,
    #[arg(long, help = "Only unread messages")]
    pub unread: bool,
    #[arg(long, help = "Gmail search query")]
    pub q: Option<String>,
    #[arg(long, help = "Continue from a page token")]
    pub page_token: Option<String>,
    #[arg(long, default_value_t = 1, help = "Number of pages to walk")]
    pub pages: u32,
    #[arg(long, help = "Fetch every listed message in full")]
    pub preload: bool,
}

#[derive(Debug, Args)]
pub struct GetArgs {
    #[arg(help = "Gmail message id")]
    pub id: String,
    #[arg(long, help = "Show the HTML body instead of plain text")]
    pub html: bool,
    #[arg(long, help = "Show the body still transport-encoded")]
    pub raw: bool,
}

#[derive(Debug, Args)]
pub struct SendArgs {
    #[arg(long, value_delimiter = ',', num_args = 1.., help = "Recipient addresses")]
    pub to: Vec<String>,
    #[arg(long, value_delimiter = ',', num_args = 1.., help = "CC addresses")]
    pub cc: Vec<String>,
    #[arg(long, value_delimiter = ',', num_args = 1.., help = "BCC addresses")]
    pub bcc: Vec<String>,
    #[arg(long, help = "Reply-To address")]
    pub reply_to: Option<String>,
    #[arg(long, visible_alias = "subj", help = "Email subject")]
    pub subject: Option<String>,
    #[arg(long, help = "Inline body text")]
    pub body: Option<String>,
    #[arg(long, help = "Read body from file")]
    pub body_file: Option<PathBuf>,
    #[arg(long, help = "Read body from stdin")]
    pub stdin: bool,
    #[arg(long, help = "Render the body from markdown")]
    pub markdown: bool,
    #[arg(long, action = ArgAction::Append, help = "Attach file (repeatable)")]
    pub attach: Vec<PathBuf>,
    #[arg(long, value_parser = clap::value_parser!(i64).range(1..=5), help = "Priority, 1 highest to 5 lowest")]
    pub priority: Option<i64>,
    #[arg(long, help = "Reply to an existing message id")]
    pub reply: Option<String>,
}

#[derive(Debug, Args)]
pub struct AttachmentsArgs {
    #[arg(help = "Gmail message id")]
    pub id: String,
    #[arg(long, help = "Download every attachment into this directory")]
    pub save: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct LabelArgs {
    #[command(subcommand)]
    pub command: LabelCommand,
}

#[derive(Debug, Subcommand)]
pub enum LabelCommand {
    Ls,
    Add(LabelMutateArgs),
    Rm(LabelMutateArgs),
    Create(LabelCreateArgs),
}

#[derive(Debug, Args)]
pub struct LabelMutateArgs {
    #[arg(help = "Gmail message id")]
    pub id: String,
    #[arg(required = true, num_args = 1.., help = "Label names or ids")]
    pub labels: Vec<String>,
}

#[derive(Debug, Args)]
pub struct LabelCreateArgs {
    #[arg(help = "Label name")]
    pub name: String,
}
