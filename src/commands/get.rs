use crate::cli::GetArgs;
use crate::context::AppContext;
use crate::error::AppResult;
use crate::mail::message::{TEXT_HTML, TEXT_PLAIN};
use crate::output::views::MessageDetail;

pub async fn run(ctx: &AppContext, args: GetArgs) -> AppResult<()> {
    let message = ctx.mailbox.get(&args.id).await?;

    let mime_type = if args.html { TEXT_HTML } else { TEXT_PLAIN };
    let body = if args.raw {
        message.body(mime_type)?.map(ToOwned::to_owned)
    } else {
        message.decoded_body(mime_type)?
    };
    let detail = MessageDetail::new(&message, body);

    if !ctx.output.is_text() {
        return ctx.output.emit("", &detail);
    }

    let summary = &detail.summary;
    println!("id: {}", summary.id);
    println!("from: {}", summary.from.as_deref().unwrap_or("(unknown sender)"));
    if let Some(to) = detail.to.to_header_value() {
        println!("to: {to}");
    }
    if let Some(cc) = detail.cc.to_header_value() {
        println!("cc: {cc}");
    }
    println!("subject: {}", summary.subject.as_deref().unwrap_or("(no subject)"));
    println!("date: {}", summary.date.as_deref().unwrap_or("(no date)"));
    if !summary.labels.is_empty() {
        println!("labels: {}", summary.labels.join(", "));
    }
    for attachment in &detail.attachments {
        println!(
            "attachment: {} ({})",
            attachment.filename().unwrap_or("(unnamed)"),
            attachment.mime_type()
        );
    }
    println!();
    println!("{}", detail.body.as_deref().unwrap_or("(no body)"));
    Ok(())
}
