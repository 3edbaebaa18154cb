//! Permission checks.

use super::CheckContext;
use crate::fluent_args;
use serenity::all::Permissions;

/// Human readable names of `permissions`, such as `Manage Messages`.
pub fn permission_names(permissions: Permissions) -> String {
    permissions.get_permission_names().join(", ")
}

impl CheckContext<'_> {
    /// Passes when the member has `permission`.
    pub fn has_permission(&mut self, permission: Permissions) {
        self.has_permissions(permission);
    }

    /// Passes when the member has every permission in `permissions`.
    pub fn has_permissions(&mut self, permissions: Permissions) {
        if !self.passed() {
            return;
        }

        let Some(held) = self.event().permissions else {
            self.log_failed("has_permissions", "Member permissions are unknown");
            self.fail();
            return;
        };

        let missing = permissions - held;

        if missing.is_empty() {
            self.log_passed("has_permissions");
            self.pass();
        } else {
            self.log_failed("has_permissions", "Member is missing permissions");
            self.fail_key_with(
                "checks-has-permission-failed",
                &fluent_args!("permission" => permission_names(missing)),
            );
        }
    }

    /// Passes when the member doesn't have `permission`.
    pub fn not_has_permission(&mut self, permission: Permissions) {
        self.not_has_permissions(permission);
    }

    /// Passes when the member has none of `permissions`.
    pub fn not_has_permissions(&mut self, permissions: Permissions) {
        if !self.passed() {
            return;
        }

        let held = self.event().permissions.unwrap_or_else(Permissions::empty) & permissions;

        if held.is_empty() {
            self.log_passed("not_has_permissions");
            self.pass();
        } else {
            self.log_failed("not_has_permissions", "Member has a forbidden permission");
            self.fail_key_with(
                "checks-not-has-permission-failed",
                &fluent_args!("permission" => permission_names(held)),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::checks::test_events::{direct_message, guild_message};
    use crate::checks::CheckContext;
    use crate::test_support::localizer;
    use serenity::all::Permissions;

    #[test]
    fn test_permission_checks() {
        let localizer = localizer();
        let mut event = guild_message();
        event.permissions = Some(Permissions::SEND_MESSAGES | Permissions::MANAGE_MESSAGES);

        let mut ctx = CheckContext::new(&event, &localizer);
        ctx.has_permission(Permissions::MANAGE_MESSAGES);
        ctx.not_has_permission(Permissions::BAN_MEMBERS);
        assert!(ctx.passed());

        let mut ctx = CheckContext::new(&event, &localizer);
        ctx.has_permissions(Permissions::MANAGE_MESSAGES | Permissions::BAN_MEMBERS);
        assert_eq!(ctx.message(), Some("Must have permission: **Ban Members**"));

        let mut ctx = CheckContext::new(&event, &localizer);
        ctx.not_has_permission(Permissions::SEND_MESSAGES);
        assert_eq!(ctx.message(), Some("Must not have permission: **Send Messages**"));
    }

    #[test]
    fn test_unknown_permissions() {
        let localizer = localizer();
        let dm = direct_message();

        let mut ctx = CheckContext::new(&dm, &localizer);
        ctx.not_has_permission(Permissions::ADMINISTRATOR);
        assert!(ctx.passed());

        ctx.has_permission(Permissions::ADMINISTRATOR);
        assert!(!ctx.passed());
        assert_eq!(ctx.message(), None);
    }
}
