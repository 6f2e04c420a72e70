//! Reply copy for the onboarding dialog.
//!
//! Swahili-first with English mirrors, matching the voice of the production
//! bot. Kept in one place so the state machine stays free of message text.

/// First reply to a brand-new contact: greeting plus the name prompt.
pub fn greeting() -> String {
    "Karibu Flight Assist! ✈️\n\
     Mimi ni msaidizi wako wa kutafuta safari za ndege.\n\n\
     Kwanza, naomba unitumie jina lako kamili (jina la kwanza na la mwisho).\n\n\
     Welcome to Flight Assist! To get started, please send me your full name \
     (first and last name)."
        .to_string()
}

/// Re-prompt after a name that failed validation.
pub fn invalid_name() -> String {
    "Samahani, sikuweza kulielewa jina hilo. 😅\n\
     Tafadhali andika jina lako kamili — jina la kwanza na la mwisho, kwa herufi tu.\n\n\
     Sorry, I couldn't read that name. Please send your full name — first and \
     last name, letters only. For example: *Morgan Mnete*"
        .to_string()
}

/// Ask the contact to confirm the captured name.
pub fn confirm_name(name: &str) -> String {
    format!(
        "Asante! Je, jina lako ni *{name}*?\n\n\
         Tafadhali jibu 'Ndio' au 'Hapana'.\n\
         (Is your name *{name}*? Please reply 'Ndio' (yes) or 'Hapana' (no).)"
    )
}

/// Re-prompt when a name confirmation reply is neither yes nor no.
pub fn reconfirm_name() -> String {
    "Tafadhali jibu kwa 'Ndio' au 'Hapana'.".to_string()
}

/// Ask for the name again after the contact rejected the captured one.
pub fn reenter_name() -> String {
    "Sawa, tafadhali niandikie tena jina lako kamili.\n\
     (Okay, please send me your full name again.)"
        .to_string()
}

/// Ask for the contact's home city.
pub fn ask_location(name: &str) -> String {
    format!(
        "Asante {name}! 🙏\n\
         Sasa, niambie ni mji gani unapoishi?\n\n\
         Kwa mfano: *Dar es Salaam*, *Arusha*, *Mwanza*, *Zanzibar*, n.k.\n\
         (Which city do you live in?)"
    )
}

/// Ask the contact to confirm the captured location.
pub fn confirm_location(location: &str) -> String {
    format!(
        "Je, unaishi *{location}*?\n\n\
         Tafadhali jibu 'Ndio' ikiwa ni sahihi, au 'Hapana' ikiwa sio sahihi. 😊"
    )
}

/// Re-prompt when a location confirmation reply is neither yes nor no.
pub fn reconfirm_location() -> String {
    "Tafadhali jibu 'Ndio' ikiwa jina la mji ni sahihi, au 'Hapana' ikiwa sio sahihi. 😊"
        .to_string()
}

/// Ask for the location again after the contact rejected the captured one.
pub fn reenter_location() -> String {
    "Sawa, tafadhali niambie tena ni mji gani unapoishi?\n\n\
     Kwa mfano: *Dar es Salaam*, *Arusha*, *Mwanza*, *Zanzibar*, n.k."
        .to_string()
}

/// Onboarding complete — the contact is now active.
pub fn welcome(first_name: &str, location: &str) -> String {
    format!(
        "Asante {first_name}! Umesajiliwa kutoka *{location}*. 🎉\n\n\
         Sasa unaweza kuanza kutafuta safari za ndege. Uko tayari kuanza? ✈️\n\n\
         Uliza chochote kile unachohitaji!"
    )
}

/// Terminal reply for phone numbers outside the supported country prefixes.
/// No contact record is created for these.
pub fn region_unsupported() -> String {
    "Oops! Kuna hitilafu kidogo 😅\n\
     Kwa sasa tunahudumia tu namba za simu za Kitanzania zinazoanza na +255 📞🇹🇿\n\
     Lakini usijali! Huduma yetu inakua kwa kasi 🌱✨ na tutakutaarifu mara tu \
     tutakapoanza kutoa huduma kwenye nchi yako! 🌍🎉\n\
     ---\n\
     Oops! There's a small issue 😅\n\
     Currently, we only support Tanzanian phone numbers starting with +255 📞🇹🇿\n\
     But don't worry! Our service is growing fast 🌱✨ and we'll notify you as \
     soon as we launch in your country! 🌍🎉"
        .to_string()
}
