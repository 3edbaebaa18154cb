//! Converters validating the shape of a token.

use super::{relayed_with, ConverterResult, SingleConverter};
use crate::fluent_args;
use crate::i18n::Localizer;
use regex::Regex;

const LOCAL_PART_SYMBOLS: &str = ".!#$%&'*+/=?^_`{|}~-";

fn is_email(input: &str) -> bool {
    let Some((local, domain)) = input.rsplit_once('@') else {
        return false;
    };

    let local_ok = !local.is_empty()
        && local.chars().all(|c| c.is_ascii_alphanumeric() || LOCAL_PART_SYMBOLS.contains(c));

    let labels: Vec<&str> = domain.split('.').collect();
    let domain_ok = labels.len() >= 2
        && labels.iter().all(|label| {
            !label.is_empty()
                && label.len() <= 63
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        });

    local_ok && domain_ok
}

/// Compiles the token as a regular expression.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegexConverter;

impl SingleConverter for RegexConverter {
    type Output = Regex;

    fn signature_type(&self) -> &'static str {
        "converters-regex-signature-type"
    }

    fn parse(&self, input: &str, ctx: &Localizer) -> ConverterResult<Regex> {
        Regex::new(input).map(Some).map_err(|e| {
            relayed_with(ctx, "converters-regex-error-invalid", &fluent_args!("reason" => e.to_string()))
        })
    }
}

/// Accepts email addresses.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmailConverter;

impl SingleConverter for EmailConverter {
    type Output = String;

    fn signature_type(&self) -> &'static str {
        "converters-email-signature-type"
    }

    fn parse(&self, input: &str, ctx: &Localizer) -> ConverterResult<String> {
        if is_email(input) {
            Ok(Some(input.to_string()))
        } else {
            Err(relayed_with(ctx, "converters-email-error-invalid", &fluent_args!("value" => input)))
        }
    }
}

/// Accepts absolute URLs. Discord's `<https://...>` embed suppression is
/// stripped first.
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlConverter;

impl SingleConverter for UrlConverter {
    type Output = url::Url;

    fn signature_type(&self) -> &'static str {
        "converters-url-signature-type"
    }

    fn parse(&self, input: &str, ctx: &Localizer) -> ConverterResult<url::Url> {
        let trimmed = input.strip_prefix('<').and_then(|s| s.strip_suffix('>')).unwrap_or(input);

        url::Url::parse(trimmed)
            .ok()
            .filter(|url| url.has_host())
            .map(Some)
            .ok_or_else(|| relayed_with(ctx, "converters-url-error-invalid", &fluent_args!("value" => input)))
    }
}
