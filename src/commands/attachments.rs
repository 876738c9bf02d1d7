use tokio::fs;

use crate::cli::AttachmentsArgs;
use crate::context::AppContext;
use crate::error::AppResult;

pub async fn run(ctx: &AppContext, args: AttachmentsArgs) -> AppResult<()> {
    let message = ctx.mailbox.get(&args.id).await?;
    let mut attachments = message.attachments();

    let Some(dir) = args.save else {
        let text = attachments
            .iter()
            .enumerate()
            .map(|(index, attachment)| {
                format!(
                    "{}. {} [{}] {}",
                    index + 1,
                    attachment.filename().unwrap_or("(unnamed)"),
                    attachment.mime_type(),
                    attachment
                        .size()
                        .map(|size| format!("{size} bytes"))
                        .unwrap_or_default()
                )
            })
            .collect::<Vec<_>>();
        let text = if text.is_empty() {
            "0 attachments".to_string()
        } else {
            text.join("\n")
        };
        return ctx.output.emit(&text, &attachments);
    };

    fs::create_dir_all(&dir).await?;
    let mut saved = Vec::with_capacity(attachments.len());
    for attachment in &mut attachments {
        let path = attachment.save_to(ctx.mailbox.transport(), &dir).await?;
        saved.push(path.display().to_string());
    }

    let text = format!("saved {} attachments to {}", saved.len(), dir.display());
    ctx.output.emit(&text, &saved)
}
