use crate::models::ticket::Ticket;

/// Decides whether two tickets may form a match. Pure and symmetric in its
/// arguments. All rules must hold:
///
/// 1. same game, region and game mode (the bucket key)
/// 2. skill tiers at most one step apart on the 8-point ladder
/// 3. languages equal, unless either side is the wildcard
/// 4. both sides agree on mic_required
/// 5. role sets compatible: either side wildcard or empty, otherwise the
///    two sets must not overlap
pub fn compatible(a: &Ticket, b: &Ticket) -> bool {
    a.bucket == b.bucket
        && a.skill_level.within_one_tier(&b.skill_level)
        && a.language.matches(&b.language)
        && a.mic_required == b.mic_required
        && a.preferred_roles.compatible_with(&b.preferred_roles)
}
