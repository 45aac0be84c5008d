//! Member-facing copy
//!
//! Every string the bot says to the community, in the community's French.
//! The wording is product copy; keep it byte for byte, emoji shortcodes
//! included, and let the platform render those client side.

use gram_core::StreakEvent;

use super::validator::RejectionReason;

/// Title of the discussion thread opened on an accepted post
#[must_use]
pub fn thread_title(display_name: &str) -> String {
    format!("Nouvelle publication dans l’electrogram de {display_name}")
}

/// Link line pointing at the author's archive page
#[must_use]
pub fn profile_link(web_base_url: &str, username: &str, display_name: &str) -> String {
    format!("Ouvrir l’electrogram de {display_name} : {web_base_url}/user/{username}")
}

/// Streak notice posted into the thread after archival
///
/// The headline and body depend on the transition; a continued chain gets
/// escalating congratulations by streak tier.
#[must_use]
pub fn streak_notice(display_name: &str, streak: i32, event: StreakEvent) -> String {
    let (headline, body) = match event {
        StreakEvent::New => (
            "Bienvenue sur club elec electrogram !".to_string(),
            "Oh mais c’est votre premier post sur club elec electrogram !\n\
             Ajoutez chaque jour un nouveau post et faites grimper votre score !"
                .to_string(),
        ),
        StreakEvent::Again => (
            format!("Votre streak de {streak} ne bouge pas d’un poil !"),
            "Vous avez déjà posté aujourd’hui.\n\
             Votre streak ne sera donc pas augmenté.\n\
             Mais cela ne vous empêche pas de poster autant de messages que vous souhaitez par jour.\n\
             Bon travail ! :+1:"
                .to_string(),
        ),
        StreakEvent::Reset => (
            "Remise à zéro de votre streak...".to_string(),
            "Votre streak est revenu à 1, car vous n’avez pas posté hier.\n\
             Essayez de poster chaque jour pour augmenter votre streak ! :wink:"
                .to_string(),
        ),
        StreakEvent::Ok => (
            format!("Votre streak est maintenant de {streak} jours !"),
            congratulation(streak).to_string(),
        ),
    };

    format!("**Streak de {display_name}**\n{headline}\n{body}")
}

/// Prompt inviting discussion in the thread
#[must_use]
pub fn discussion_prompt(display_name: &str) -> String {
    format!(
        "**Discutez de cette publication avec {display_name} !**\n\
         Vous avez quelque chose à dire, des avis, des suggestions, des insultes... ?\n\
         Faites-le donc dans ce fil, c’est fait pour cela. :smile:"
    )
}

/// Private notice explaining a refused submission
#[must_use]
pub fn rejection_notice(reason: RejectionReason) -> &'static str {
    match reason {
        RejectionReason::MissingContent => {
            "Coucou ! :wave:\n\
             Votre publication a été malheureusement refusée... :sob:\n\
             Pour être publiée sur electrogram, elle doit contenir du texte ainsi qu’une ou plusieurs images et/ou vidéos.\n\
             Réessayez, je reste à votre service. :wink:"
        }
        RejectionReason::DisallowedType => {
            "Coucou ! :wave:\n\
             Votre publication a été malheureusement refusée... :sob:\n\
             Vous avez envoyé un fichier qui n’est pas une image ou une vidéo.\n\
             Réessayez, je reste à votre service. :wink:"
        }
    }
}

/// Private notice when archival failed after acceptance
#[must_use]
pub fn failure_notice() -> &'static str {
    "Coucou ! :wave:\n\
     Une erreur est survenue... :sob:\n\
     Nous faisons tout notre possible pour résoudre ce problème\n\
     Retentez dans quelques minutes."
}

/// Congratulation line for a continued chain
fn congratulation(streak: i32) -> &'static str {
    if streak == 2 {
        "Votre chaîne débute, c’est beau !\nContinuez comme cela ! :muscle:"
    } else if streak == 3 {
        "Super travail ! :fire:"
    } else if streak <= 5 {
        "Impressionnant ! :tada:"
    } else if streak <= 10 {
        "Incroyable ! :star2:"
    } else if streak <= 15 {
        "Spectaculaire ! :trophy:"
    } else if streak <= 20 {
        "Fantastique ! :medal:"
    } else if streak <= 25 {
        "Époustouflant ! :crown:"
    } else if streak <= 30 {
        "Incroyable ! :sparkles:"
    } else {
        "Félicitations ! \u{1F680}"
    }
}
