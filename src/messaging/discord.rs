//! Discord messaging adapter.
//!
//! Serenity runs every gateway event in its own task, so a slow generation
//! for one mention never holds up heartbeats or other events.

use crate::dispatch::story::{STORY_COMMAND, STORY_DESCRIPTION, STORY_OPTIONS};
use crate::dispatch::{self, IncomingMessage, StoryInvocation};
use crate::error::{MessagingError, Result};
use crate::llm::LlmBridge;
use crate::messaging::traits::{ChannelReply, InteractionReply};

use async_trait::async_trait;
use serenity::all::{
    ChannelId, Command, CommandInteraction, CommandOptionType, Context, CreateCommand,
    CreateCommandOption, CreateInteractionResponseFollowup, EventHandler, GatewayIntents, GuildId,
    Http, Interaction, Message, Ready, ResumedEvent, ShardStageUpdateEvent,
};
use std::sync::Arc;

/// Intents the bot needs to see mentions and message text.
pub fn gateway_intents() -> GatewayIntents {
    GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_MEMBERS
}

/// Slash command definition for `/tellstory`.
pub fn story_command() -> CreateCommand {
    STORY_OPTIONS.iter().fold(
        CreateCommand::new(STORY_COMMAND).description(STORY_DESCRIPTION),
        |command, (name, description)| {
            command.add_option(
                CreateCommandOption::new(CommandOptionType::String, *name, *description)
                    .required(true),
            )
        },
    )
}

/// Serenity event handler routing mentions and slash commands to the bridge.
pub struct DiscordHandler {
    bridge: Arc<LlmBridge>,
    guild_id: Option<GuildId>,
}

impl DiscordHandler {
    pub fn new(bridge: Arc<LlmBridge>, guild_id: Option<u64>) -> Self {
        Self {
            bridge,
            guild_id: guild_id.map(GuildId::new),
        }
    }

    async fn register_commands(&self, ctx: &Context) {
        let result = match self.guild_id {
            Some(guild_id) => guild_id.set_commands(&ctx.http, vec![story_command()]).await,
            None => Command::set_global_commands(&ctx.http, vec![story_command()]).await,
        };

        match result {
            Ok(commands) => tracing::info!(
                count = commands.len(),
                guild_id = ?self.guild_id.map(|id| id.get()),
                "registered slash commands"
            ),
            Err(error) => tracing::error!(%error, "failed to register slash commands"),
        }
    }
}

#[async_trait]
impl EventHandler for DiscordHandler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        tracing::info!(
            bot = %ready.user.name,
            guilds = ready.guilds.len(),
            "connected to Discord"
        );
        self.register_commands(&ctx).await;
    }

    async fn resume(&self, _ctx: Context, _event: ResumedEvent) {
        tracing::info!("Discord session resumed");
    }

    async fn shard_stage_update(&self, _ctx: Context, event: ShardStageUpdateEvent) {
        tracing::info!(
            shard = ?event.shard_id,
            old = ?event.old,
            new = ?event.new,
            "gateway connection stage changed"
        );
    }

    async fn message(&self, ctx: Context, msg: Message) {
        let bot_id = ctx.cache.current_user().id.get();

        let incoming = IncomingMessage {
            author_id: msg.author.id.get(),
            author_name: msg.author.name.clone(),
            mentioned_user_ids: msg.mentions.iter().map(|user| user.id.get()).collect(),
            mentions_everyone: msg.mention_everyone,
            content: msg.content.clone(),
        };
        let reply = DiscordChannelReply {
            http: ctx.http.clone(),
            channel_id: msg.channel_id,
        };

        if let Err(error) = dispatch::handle_mention(&*self.bridge, bot_id, &incoming, &reply).await
        {
            tracing::error!(%error, channel_id = %msg.channel_id, "failed to deliver mention reply");
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Interaction::Command(command) = interaction else {
            return;
        };
        if command.data.name != STORY_COMMAND {
            tracing::debug!(command = %command.data.name, "ignoring unknown slash command");
            return;
        }

        let invocation = StoryInvocation {
            user: command.user.name.clone(),
            options: command
                .data
                .options
                .iter()
                .filter_map(|option| {
                    option
                        .value
                        .as_str()
                        .map(|value| (option.name.clone(), value.to_string()))
                })
                .collect(),
        };
        let reply = DiscordInteractionReply {
            http: ctx.http.clone(),
            command,
        };

        if let Err(error) = dispatch::tell_story(&*self.bridge, &invocation, &reply).await {
            tracing::error!(%error, user = %invocation.user, "failed to deliver story");
        }
    }
}

/// Sends into the channel a message arrived in.
pub struct DiscordChannelReply {
    http: Arc<Http>,
    channel_id: ChannelId,
}

impl ChannelReply for DiscordChannelReply {
    async fn send_text(&self, text: &str) -> Result<()> {
        self.channel_id
            .say(&self.http, text)
            .await
            .map_err(MessagingError::from)?;
        Ok(())
    }
}

/// Defers and follows up on a slash command interaction.
pub struct DiscordInteractionReply {
    http: Arc<Http>,
    command: CommandInteraction,
}

impl InteractionReply for DiscordInteractionReply {
    async fn defer(&self) -> Result<()> {
        self.command
            .defer(&self.http)
            .await
            .map_err(MessagingError::from)?;
        Ok(())
    }

    async fn follow_up(&self, text: &str) -> Result<()> {
        let builder = CreateInteractionResponseFollowup::new().content(text);
        self.command
            .create_followup(&self.http, builder)
            .await
            .map_err(MessagingError::from)?;
        Ok(())
    }
}
