//! A Discord-independent snapshot of the event that triggered a command.
//!
//! Checks only look at an [`EventContext`], never at serenity models, so
//! they can be evaluated in tests without a gateway connection.

use serenity::all::{
    Channel, ChannelId, ChannelType, CommandInteraction, ComponentInteraction, Context, Guild, GuildChannel,
    GuildId, Message, Permissions, RoleId, User, UserId,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, trace};

/// What sort of channel the event happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    /// A regular guild channel.
    Text,
    /// A thread inside a guild channel.
    Thread,
    /// A direct message.
    Direct,
}

/// Users the bot treats as privileged, independent of any guild.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrivilegedUsers {
    /// Bot owners.
    pub owners: HashSet<UserId>,
    /// Bot administrators.
    pub admins: HashSet<UserId>,
}

impl PrivilegedUsers {
    /// Builds the sets from raw ids, as found in the configuration.
    pub fn from_ids(owners: &[u64], admins: &[u64]) -> Self {
        Self {
            owners: owners.iter().copied().map(UserId::new).collect(),
            admins: admins.iter().copied().map(UserId::new).collect(),
        }
    }
}

/// What checks know about an invocation.
#[derive(Debug, Clone)]
pub struct EventContext {
    /// The invoking user.
    pub author: UserId,
    /// Whether the invoking user is a bot.
    pub author_is_bot: bool,
    /// The guild, unless this is a direct message.
    pub guild: Option<GuildId>,
    /// The channel the command was used in.
    pub channel: ChannelId,
    /// The kind of that channel.
    pub channel_kind: ChannelKind,
    /// The category containing the channel. For threads, the category of
    /// the thread's parent.
    pub category: Option<ChannelId>,
    /// Sorting position of the channel, when known.
    pub channel_position: Option<u16>,
    /// Whether the channel is age restricted, when known.
    pub nsfw: Option<bool>,
    /// The member's roles.
    pub member_roles: Vec<RoleId>,
    /// Positions of every role in the guild.
    pub role_positions: HashMap<RoleId, u16>,
    /// Positions of every channel in the guild.
    pub channel_positions: HashMap<ChannelId, u16>,
    /// The member's guild permissions, when known.
    pub permissions: Option<Permissions>,
    /// Whether the invoking user owns the guild.
    pub is_guild_owner: bool,
    /// The bot's own permissions, when known.
    pub bot_permissions: Option<Permissions>,
    /// The user's locale, for interactions.
    pub locale: Option<String>,
    /// Bot owners and administrators.
    pub privileged: Arc<PrivilegedUsers>,
}

impl EventContext {
    /// A direct message event with nothing else known.
    pub fn new(author: UserId, channel: ChannelId) -> Self {
        Self {
            author,
            author_is_bot: false,
            guild: None,
            channel,
            channel_kind: ChannelKind::Direct,
            category: None,
            channel_position: None,
            nsfw: None,
            member_roles: Vec::new(),
            role_positions: HashMap::new(),
            channel_positions: HashMap::new(),
            permissions: None,
            is_guild_owner: false,
            bot_permissions: None,
            locale: None,
            privileged: Arc::default(),
        }
    }

    /// The position of the member's highest role, if they have any.
    pub fn top_role_position(&self) -> Option<u16> {
        self.member_roles
            .iter()
            .filter_map(|role| self.role_positions.get(role))
            .copied()
            .max()
    }

    /// The member's highest role.
    pub fn top_role(&self) -> Option<RoleId> {
        self.member_roles
            .iter()
            .filter_map(|role| self.role_positions.get(role).map(|position| (*position, *role)))
            .max()
            .map(|(_, role)| role)
    }

    /// Whether the author is a bot owner.
    pub fn is_bot_owner(&self) -> bool {
        self.privileged.owners.contains(&self.author)
    }

    /// Whether the author is a bot administrator. Owners count as
    /// administrators.
    pub fn is_bot_admin(&self) -> bool {
        self.is_bot_owner() || self.privileged.admins.contains(&self.author)
    }

    /// Snapshots a message event.
    pub async fn from_message(ctx: &Context, message: &Message, privileged: Arc<PrivilegedUsers>) -> Self {
        let roles = message.member.as_ref().map(|member| member.roles.clone());

        Self::capture(
            ctx,
            &message.author,
            message.guild_id,
            message.channel_id,
            Snapshot {
                roles,
                permissions: None,
                bot_permissions: None,
                locale: None,
            },
            privileged,
        )
        .await
    }

    /// Snapshots a slash command interaction.
    pub async fn from_command(
        ctx: &Context,
        interaction: &CommandInteraction,
        privileged: Arc<PrivilegedUsers>,
    ) -> Self {
        let member = interaction.member.as_deref();

        Self::capture(
            ctx,
            &interaction.user,
            interaction.guild_id,
            interaction.channel_id,
            Snapshot {
                roles: member.map(|member| member.roles.clone()),
                permissions: member.and_then(|member| member.permissions),
                bot_permissions: interaction.app_permissions,
                locale: Some(interaction.locale.clone()),
            },
            privileged,
        )
        .await
    }

    /// Snapshots a component interaction.
    pub async fn from_component(
        ctx: &Context,
        interaction: &ComponentInteraction,
        privileged: Arc<PrivilegedUsers>,
    ) -> Self {
        let member = interaction.member.as_ref();

        Self::capture(
            ctx,
            &interaction.user,
            interaction.guild_id,
            interaction.channel_id,
            Snapshot {
                roles: member.map(|member| member.roles.clone()),
                permissions: member.and_then(|member| member.permissions),
                bot_permissions: interaction.app_permissions,
                locale: Some(interaction.locale.clone()),
            },
            privileged,
        )
        .await
    }

    async fn capture(
        ctx: &Context,
        author: &User,
        guild: Option<GuildId>,
        channel: ChannelId,
        snapshot: Snapshot,
        privileged: Arc<PrivilegedUsers>,
    ) -> Self {
        let mut event = Self::new(author.id, channel);

        event.author_is_bot = author.bot;
        event.guild = guild;
        event.locale = snapshot.locale;
        event.bot_permissions = snapshot.bot_permissions;
        event.privileged = privileged;

        let Some(guild_id) = guild else {
            return event;
        };

        event.channel_kind = ChannelKind::Text;
        event.member_roles = snapshot.roles.unwrap_or_default();
        event.permissions = snapshot.permissions;

        let bot = ctx.cache.current_user().id;

        // The cache guard can't be held across an await
        let cached = ctx
            .cache
            .guild(guild_id)
            .map(|guild| event.fill_from_guild(&guild, bot));

        match cached {
            Some(true) => {}
            Some(false) | None => event.fill_from_http(ctx, guild_id).await,
        }

        trace!(?event, "Captured event context");
        event
    }

    /// Fills in guild details from the cache. Returns whether the member was
    /// cached too.
    fn fill_from_guild(&mut self, guild: &Guild, bot: UserId) -> bool {
        self.is_guild_owner = guild.owner_id == self.author;
        self.role_positions = guild.roles.iter().map(|(id, role)| (*id, role.position)).collect();
        self.channel_positions = guild.channels.iter().map(|(id, channel)| (*id, channel.position)).collect();

        let channel = guild
            .channels
            .get(&self.channel)
            .or_else(|| guild.threads.iter().find(|thread| thread.id == self.channel));

        if let Some(channel) = channel {
            self.fill_from_channel(channel, |parent| guild.channels.get(&parent).and_then(|c| c.parent_id));
        }

        let member = guild.members.get(&self.author);

        if let Some(member) = member {
            self.member_roles.clone_from(&member.roles);
        }

        if self.permissions.is_none() {
            self.permissions = Some(guild_permissions(guild, &self.member_roles, self.is_guild_owner));
        }

        if self.bot_permissions.is_none() {
            self.bot_permissions = guild
                .members
                .get(&bot)
                .map(|member| guild_permissions(guild, &member.roles, guild.owner_id == bot));
        }

        member.is_some() || !self.member_roles.is_empty()
    }

    fn fill_from_channel(&mut self, channel: &GuildChannel, parent_category: impl Fn(ChannelId) -> Option<ChannelId>) {
        self.nsfw = Some(channel.nsfw);

        if matches!(
            channel.kind,
            ChannelType::PublicThread | ChannelType::PrivateThread | ChannelType::NewsThread
        ) {
            self.channel_kind = ChannelKind::Thread;
            self.category = channel.parent_id.and_then(parent_category);
        } else {
            self.channel_kind = ChannelKind::Text;
            self.category = channel.parent_id;
            self.channel_position = Some(channel.position);
        }
    }

    async fn fill_from_http(&mut self, ctx: &Context, guild_id: GuildId) {
        debug!(guild = %guild_id, "Guild details not cached, asking Discord");

        if self.member_roles.is_empty() {
            match ctx.http.get_member(guild_id, self.author).await {
                Ok(member) => self.member_roles = member.roles,
                Err(e) => debug!(error = %e, "Could not fetch member"),
            }
        }

        if self.nsfw.is_none() {
            match self.channel.to_channel(ctx).await {
                Ok(Channel::Guild(channel)) => self.fill_from_channel(&channel, |_| None),
                Ok(_) => {}
                Err(e) => debug!(error = %e, "Could not fetch channel"),
            }
        }
    }
}

struct Snapshot {
    roles: Option<Vec<RoleId>>,
    permissions: Option<Permissions>,
    bot_permissions: Option<Permissions>,
    locale: Option<String>,
}

/// Guild-wide permissions of a member: the `@everyone` role plus every role
/// they hold. Owners and administrators have every permission.
pub fn guild_permissions(guild: &Guild, roles: &[RoleId], is_owner: bool) -> Permissions {
    if is_owner {
        return Permissions::all();
    }

    let everyone = RoleId::new(guild.id.get());

    let permissions = std::iter::once(&everyone)
        .chain(roles)
        .filter_map(|role| guild.roles.get(role))
        .fold(Permissions::empty(), |acc, role| acc | role.permissions);

    if permissions.contains(Permissions::ADMINISTRATOR) {
        Permissions::all()
    } else {
        permissions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_role() {
        let mut event = EventContext::new(UserId::new(1), ChannelId::new(2));
        assert_eq!(event.top_role(), None);

        event.role_positions = HashMap::from([(RoleId::new(10), 1), (RoleId::new(11), 5), (RoleId::new(12), 9)]);
        event.member_roles = vec![RoleId::new(10), RoleId::new(11)];

        assert_eq!(event.top_role(), Some(RoleId::new(11)));
        assert_eq!(event.top_role_position(), Some(5));
    }

    #[test]
    fn test_privileged_users() {
        let mut event = EventContext::new(UserId::new(1), ChannelId::new(2));
        assert!(!event.is_bot_admin());

        event.privileged = Arc::new(PrivilegedUsers::from_ids(&[1], &[]));
        assert!(event.is_bot_owner());
        assert!(event.is_bot_admin());

        event.privileged = Arc::new(PrivilegedUsers::from_ids(&[], &[1]));
        assert!(!event.is_bot_owner());
        assert!(event.is_bot_admin());
    }
}
