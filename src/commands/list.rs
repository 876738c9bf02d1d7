use crate::api::client::GmailClient;
use crate::cli::ListArgs;
use crate::context::AppContext;
use crate::error::{AppError, AppResult};
use crate::mailbox::MessageQuery;
use crate::output::views::{MessageSummary, PageView};

pub async fn run(ctx: &AppContext, args: ListArgs) -> AppResult<()> {
    let limit = args.limit.unwrap_or_else(|| ctx.settings.page_size());
    if limit == 0 {
        return Err(AppError::InvalidInput(
            "--limit must be greater than 0".to_string(),
        ));
    }

    let mut query = build_query(ctx.mailbox.messages().take(i64::from(limit)), &args);
    let mut summaries = Vec::new();
    let mut page = query.all(args.page_token.as_deref()).await?;

    for walked in 1..=args.pages.max(1) {
        summaries.extend(page.messages.iter().map(MessageSummary::from_message));
        if walked == args.pages.max(1) || !query.has_next_page() {
            break;
        }
        page = query.next().await?;
    }

    let view = PageView {
        messages: summaries,
        next_page_token: query.page_token().map(ToOwned::to_owned),
    };

    if !ctx.output.is_text() {
        return ctx.output.emit("", &view);
    }

    if view.messages.is_empty() {
        println!("0 messages");
        return Ok(());
    }

    for (index, message) in view.messages.iter().enumerate() {
        println!("{}. {}", index + 1, message.id);
        if message.loaded {
            let from = message.from.as_deref().unwrap_or("(unknown sender)");
            let subject = message.subject.as_deref().unwrap_or("(no subject)");
            let date = message.date.as_deref().unwrap_or("(no date)");
            println!("   from: {from}");
            println!("   subject: {subject}");
            println!("   date: {date}");
            println!();
            println!("   {}", format_preview(message.snippet.as_deref()));
        }

        if index + 1 < view.messages.len() {
            println!();
        }
    }

    if let Some(token) = &view.next_page_token {
        println!();
        println!("next page: --page-token {token}");
    }

    Ok(())
}

fn build_query<'a>(
    query: MessageQuery<'a, GmailClient>,
    args: &ListArgs,
) -> MessageQuery<'a, GmailClient> {
    let mut query = query;
    if args.inbox {
        query = query.in_box();
    }
    if args.unread {
        query = query.unread();
    }
    if let Some(raw) = args.q.as_deref() {
        query = query.query(raw);
    }
    if args.preload {
        query = query.preload();
    }
    query
}

fn format_preview(snippet: Option<&str>) -> String {
    let snippet = snippet.unwrap_or("(no preview)");
    let decoded = html_escape::decode_html_entities(snippet);
    let compact = decoded.split_whitespace().collect::<Vec<_>>().join(" ");

    if compact.len() <= 120 {
        return compact;
    }

    let mut end = 120;
    while !compact.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &compact[..end])
}
