//! Dry contact (WHO 25) commands.

use super::Command;

pub fn dry_contact_status(where_: &str) -> Command {
    Command::new(
        format!("*#25*{where_}##"),
        format!("Requesting dry contact {where_} status."),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_request() {
        let cmd = dry_contact_status("315");
        assert_eq!(cmd.frame(), "*#25*315##");
        assert!(cmd.is_status_request());
    }
}
