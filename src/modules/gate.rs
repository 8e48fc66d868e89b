use crate::modules::parser::Command;

/// A privileged command was refused. Carries nothing about the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Denied;

/// Let open commands through; privileged ones need the caller's moderator flag.
pub fn authorize(command: &Command, is_moderator: bool) -> Result<(), Denied> {
    if command.is_privileged() && !is_moderator {
        return Err(Denied);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_commands_pass_without_flag() {
        assert_eq!(authorize(&Command::Work, false), Ok(()));
        assert_eq!(authorize(&Command::Help, false), Ok(()));
    }

    #[test]
    fn privileged_commands_need_the_flag() {
        let promote = Command::Promote {
            target: Some("U1".into()),
        };
        assert_eq!(authorize(&promote, false), Err(Denied));
        assert_eq!(authorize(&promote, true), Ok(()));
        assert_eq!(
            authorize(&Command::SetGroupOpen { open: false }, false),
            Err(Denied)
        );
    }

    #[test]
    fn moderation_variants_are_all_gated() {
        for command in [
            Command::Kick { target: None },
            Command::Vote {
                target: Some("U2".into()),
            },
            Command::SetGroupOpen { open: true },
        ] {
            assert_eq!(authorize(&command, false), Err(Denied), "{:?}", command);
        }
        let buy = Command::Buy {
            item: "Huevo de Mascota".into(),
        };
        assert_eq!(authorize(&buy, false), Ok(()));
    }
}
