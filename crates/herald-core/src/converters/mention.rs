//! Id and mention converters.

use super::{relayed_with, ConverterResult, OptionValue, SingleConverter};
use crate::fluent_args;
use crate::i18n::Localizer;
use herald_common::{parse_channel_mention, parse_role_mention, parse_snowflake, parse_user_mention};
use serenity::all::{ChannelId, CommandOptionType, RoleId, UserId};

/// Accepts a raw Discord id.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnowflakeConverter;

impl SingleConverter for SnowflakeConverter {
    type Output = u64;

    fn signature_type(&self) -> &'static str {
        "converters-snowflake-signature-type"
    }

    fn parse(&self, input: &str, ctx: &Localizer) -> ConverterResult<u64> {
        parse_snowflake(input)
            .map(Some)
            .ok_or_else(|| relayed_with(ctx, "converters-snowflake-error-invalid", &fluent_args!("value" => input)))
    }
}

/// Accepts a user mention or id.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserConverter;

impl SingleConverter for UserConverter {
    type Output = UserId;

    fn signature_type(&self) -> &'static str {
        "converters-user-signature-type"
    }

    fn parse(&self, input: &str, ctx: &Localizer) -> ConverterResult<UserId> {
        parse_user_mention(input)
            .map(|id| Some(UserId::new(id)))
            .ok_or_else(|| relayed_with(ctx, "converters-user-error-invalid", &fluent_args!("value" => input)))
    }

    fn parse_option(&self, value: &OptionValue, ctx: &Localizer) -> ConverterResult<UserId> {
        match value {
            OptionValue::User(id) | OptionValue::Mentionable(id) => Ok(Some(UserId::new(*id))),
            other => self.parse(&other.to_string(), ctx),
        }
    }

    fn option_type(&self) -> CommandOptionType {
        CommandOptionType::User
    }
}

/// Accepts a role mention or id.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoleConverter;

impl SingleConverter for RoleConverter {
    type Output = RoleId;

    fn signature_type(&self) -> &'static str {
        "converters-role-signature-type"
    }

    fn parse(&self, input: &str, ctx: &Localizer) -> ConverterResult<RoleId> {
        parse_role_mention(input)
            .map(|id| Some(RoleId::new(id)))
            .ok_or_else(|| relayed_with(ctx, "converters-role-error-invalid", &fluent_args!("value" => input)))
    }

    fn parse_option(&self, value: &OptionValue, ctx: &Localizer) -> ConverterResult<RoleId> {
        match value {
            OptionValue::Role(id) | OptionValue::Mentionable(id) => Ok(Some(RoleId::new(*id))),
            other => self.parse(&other.to_string(), ctx),
        }
    }

    fn option_type(&self) -> CommandOptionType {
        CommandOptionType::Role
    }
}

/// Accepts a channel mention or id.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChannelConverter;

impl SingleConverter for ChannelConverter {
    type Output = ChannelId;

    fn signature_type(&self) -> &'static str {
        "converters-channel-signature-type"
    }

    fn parse(&self, input: &str, ctx: &Localizer) -> ConverterResult<ChannelId> {
        parse_channel_mention(input)
            .map(|id| Some(ChannelId::new(id)))
            .ok_or_else(|| relayed_with(ctx, "converters-channel-error-invalid", &fluent_args!("value" => input)))
    }

    fn parse_option(&self, value: &OptionValue, ctx: &Localizer) -> ConverterResult<ChannelId> {
        match value {
            OptionValue::Channel(id) => Ok(Some(ChannelId::new(*id))),
            other => self.parse(&other.to_string(), ctx),
        }
    }

    fn option_type(&self) -> CommandOptionType {
        CommandOptionType::Channel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::localizer;

    #[test]
    fn test_mentions_and_ids() {
        let ctx = localizer();

        assert_eq!(UserConverter.parse("<@!42>", &ctx).unwrap(), Some(UserId::new(42)));
        assert_eq!(UserConverter.parse("42", &ctx).unwrap(), Some(UserId::new(42)));
        assert_eq!(RoleConverter.parse("<@&7>", &ctx).unwrap(), Some(RoleId::new(7)));
        assert_eq!(ChannelConverter.parse("<#9>", &ctx).unwrap(), Some(ChannelId::new(9)));
        assert_eq!(SnowflakeConverter.parse("123", &ctx).unwrap(), Some(123));
    }

    #[test]
    fn test_rejections() {
        let ctx = localizer();

        assert_eq!(
            UserConverter.parse("<#9>", &ctx).unwrap_err().message(),
            "Value `<#9>` is not a valid user mention or ID"
        );
        assert!(SnowflakeConverter.parse("0", &ctx).is_err());
        assert!(RoleConverter.parse("everyone", &ctx).is_err());
    }

    #[test]
    fn test_option_values() {
        let ctx = localizer();

        assert_eq!(UserConverter.parse_option(&OptionValue::User(5), &ctx).unwrap(), Some(UserId::new(5)));
        assert_eq!(
            ChannelConverter.parse_option(&OptionValue::Channel(6), &ctx).unwrap(),
            Some(ChannelId::new(6))
        );
    }
}
