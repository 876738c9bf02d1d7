use crate::api::models::RawMessage;
use crate::cli::{LabelCommand, LabelCreateArgs, LabelMutateArgs};
use crate::context::AppContext;
use crate::error::AppResult;
use crate::mail::Message;

pub async fn run(ctx: &AppContext, command: LabelCommand) -> AppResult<()> {
    match command {
        LabelCommand::Ls => list(ctx).await,
        LabelCommand::Add(args) => mutate(ctx, args, true).await,
        LabelCommand::Rm(args) => mutate(ctx, args, false).await,
        LabelCommand::Create(args) => create(ctx, args).await,
    }
}

async fn list(ctx: &AppContext) -> AppResult<()> {
    let labels = ctx.mailbox.labels().await?;

    let text = if labels.is_empty() {
        "0 labels".to_string()
    } else {
        labels
            .iter()
            .enumerate()
            .map(|(index, label)| {
                let kind = label.kind.as_deref().unwrap_or("user");
                if label.id == label.name {
                    format!("{}. {} [{kind}]", index + 1, label.name)
                } else {
                    format!("{}. {} [{kind}] (id: {})", index + 1, label.name, label.id)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    ctx.output.emit(&text, &labels)
}

async fn mutate(ctx: &AppContext, args: LabelMutateArgs, add: bool) -> AppResult<()> {
    let mut message = Message::from_raw(RawMessage::stub(args.id, None), ctx.mailbox.user_id());

    let result = if add {
        ctx.mailbox.add_labels(&mut message, &args.labels).await?
    } else {
        ctx.mailbox.remove_labels(&mut message, &args.labels).await?
    };

    let verb = if add { "added" } else { "removed" };
    let labels = message.labels().iter().cloned().collect::<Vec<_>>();
    let text = format!(
        "labels {verb} on {}; now: {}",
        result.id,
        if labels.is_empty() {
            "(none)".to_string()
        } else {
            labels.join(", ")
        }
    );
    ctx.output.emit(&text, &result)
}

async fn create(ctx: &AppContext, args: LabelCreateArgs) -> AppResult<()> {
    let label = ctx.mailbox.first_or_create_label(&args.name).await?;
    let text = format!("label {} (id: {})", label.name, label.id);
    ctx.output.emit(&text, &label)
}
