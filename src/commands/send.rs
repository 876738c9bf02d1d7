use std::fs;
use std::io::{self, Read};

use crate::cli::SendArgs;
use crate::context::AppContext;
use crate::error::{AppError, AppResult};
use crate::mail::{AddressList, MessageBuilder};
use crate::output::views::MessageSummary;

pub async fn run(ctx: &AppContext, args: SendArgs) -> AppResult<()> {
    let body = read_body(&args)?;
    let builder = configure(&args, &body)?;

    let sent = match args.reply.as_deref() {
        Some(reply_id) => {
            let original = ctx.mailbox.get(reply_id).await?;
            ctx.mailbox.reply(&original, builder.build()).await?
        }
        None => {
            if args.subject.is_none() {
                return Err(AppError::InvalidInput(
                    "--subject is required unless --reply is used".to_string(),
                ));
            }
            ctx.mailbox.send(builder.build()).await?
        }
    };

    let text = format!("sent message {}", sent.id());
    ctx.output.emit(&text, &MessageSummary::from_message(&sent))
}

fn configure(args: &SendArgs, body: &str) -> AppResult<MessageBuilder> {
    let mut builder = MessageBuilder::new()
        .to(address_list(&args.to))
        .cc(address_list(&args.cc))
        .bcc(address_list(&args.bcc));

    builder = if args.markdown {
        builder.markdown(body)
    } else {
        builder.html(plain_text_to_html(body))
    };

    if let Some(reply_to) = args.reply_to.as_deref() {
        builder = builder.reply_to(reply_to);
    }
    if let Some(subject) = &args.subject {
        builder = builder.subject(subject.trim());
    }
    if let Some(priority) = args.priority {
        builder = builder.priority(priority);
    }
    for path in &args.attach {
        builder = builder.attach(path)?;
    }

    Ok(builder)
}

fn address_list(values: &[String]) -> AddressList {
    AddressList::parse(&values.join(", "))
}

/// Escapes text for an HTML body, keeping its line breaks.
fn plain_text_to_html(text: &str) -> String {
    html_escape::encode_text(text)
        .lines()
        .collect::<Vec<_>>()
        .join("<br>\r\n")
}

fn read_body(args: &SendArgs) -> AppResult<String> {
    let selected = [args.body.is_some(), args.body_file.is_some(), args.stdin]
        .into_iter()
        .filter(|chosen| *chosen)
        .count();

    match selected {
        0 => {
            return Err(AppError::InvalidInput(
                "missing body source; pass one of --body, --body-file, or --stdin".to_string(),
            ));
        }
        1 => {}
        _ => {
            return Err(AppError::InvalidInput(
                "pass only one body source: --body, --body-file, or --stdin".to_string(),
            ));
        }
    }

    if let Some(body) = &args.body {
        return Ok(body.clone());
    }

    if let Some(path) = &args.body_file {
        return Ok(fs::read_to_string(path)?);
    }

    let mut body = String::new();
    io::stdin().read_to_string(&mut body)?;
    Ok(body)
}
