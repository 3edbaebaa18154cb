//! Usage signatures, such as `<user: user> [reason: text]`.

use crate::arguments::Arguments;
use crate::i18n::Localizer;

/// Builds the signature of `arguments` in the localizer's locale.
///
/// Required arguments are wrapped in `<>`, optional ones in `[]`. The type
/// follows the name for converters that show it, defaulting arguments add
/// `=default` and lists end in `...`.
pub fn signature(arguments: &Arguments, ctx: &Localizer) -> String {
    arguments
        .iter()
        .map(|argument| {
            let required = argument.required();
            let mut part = String::from(if required { "<" } else { "[" });

            part.push_str(argument.name());

            if argument.show_type_in_signature() {
                part.push_str(": ");
                part.push_str(&ctx.translate(argument.signature_type()));

                if let Some(default) = argument.default_display() {
                    part.push('=');
                    part.push_str(default);
                }
            }

            if argument.kind().is_list() {
                part.push_str("...");
            }

            part.push(if required { '>' } else { ']' });
            part
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converters::{BooleanConverter, IntConverter, StringCoalescingConverter, StringConverter, UserConverter};
    use crate::test_support::localizer;

    #[test]
    fn test_signature() {
        let mut args = Arguments::new();
        args.single("target", "", UserConverter);
        args.defaulting("times", "", IntConverter::new(), 2);
        args.optional("loud", "", BooleanConverter);
        args.list("tags", "", StringConverter::new(), false);
        args.coalescing("message", "", StringCoalescingConverter::new());

        insta::assert_snapshot!(
            signature(&args, &localizer()),
            @"<target: user> [times: number=2] [loud: yes/no] [tags...] <message>"
        );
    }

    #[test]
    fn test_empty_signature() {
        assert_eq!(signature(&Arguments::new(), &localizer()), "");
    }
}
