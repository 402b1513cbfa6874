use crate::process::Player;
use crate::types::Action;

pub(super) fn dispatch_drums(action: &Action, player: &Player) {
    match action {
        Action::PlayTrack(index) => {
            if let Err(e) = player.play(*index) {
                log::error!(target: "player", "{}", e);
            }
        }
        Action::StopTrack => match player.stop() {
            Ok(_) => {}
            Err(e) => log::error!(target: "player", "{}", e),
        },
        _ => {}
    }
}
