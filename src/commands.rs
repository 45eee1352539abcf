//! Resource names accepted on the command line, with aliases and fuzzy lookup

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
  Faculty,
  Courses,
  Rooms,
  TimeSlots,
  Schedules,
}

#[derive(Debug, Clone)]
pub struct ResourceName {
  pub kind: ResourceKind,
  pub name: &'static str,
  pub aliases: &'static [&'static str],
  pub description: &'static str,
}

/// All resources the CLI can list and edit
pub const RESOURCES: &[ResourceName] = &[
  ResourceName {
    kind: ResourceKind::Faculty,
    name: "faculty",
    aliases: &["f", "teachers", "staff"],
    description: "Faculty members",
  },
  ResourceName {
    kind: ResourceKind::Courses,
    name: "courses",
    aliases: &["c", "course"],
    description: "Courses offered by departments",
  },
  ResourceName {
    kind: ResourceKind::Rooms,
    name: "rooms",
    aliases: &["r", "room"],
    description: "Teaching rooms",
  },
  ResourceName {
    kind: ResourceKind::TimeSlots,
    name: "timeslots",
    aliases: &["t", "slots", "timeslot"],
    description: "Bookable time slots",
  },
  ResourceName {
    kind: ResourceKind::Schedules,
    name: "schedules",
    aliases: &["s", "schedule"],
    description: "Raw course schedule rows",
  },
];

/// Get matching resources for a given input, best match first
pub fn get_suggestions(input: &str) -> Vec<&'static ResourceName> {
  let input_lower = input.trim().to_lowercase();

  if input_lower.is_empty() {
    return RESOURCES.iter().collect();
  }

  let mut matches: Vec<(&ResourceName, u32)> = RESOURCES
    .iter()
    .filter_map(|res| rank(res, &input_lower).map(|r| (res, r)))
    .collect();

  // Sort by priority
  matches.sort_by_key(|(_, priority)| *priority);

  matches.into_iter().map(|(res, _)| res).collect()
}

/// Resolve user input to a single resource.
///
/// Ambiguous input resolves only when the best match is strictly better
/// than the runner-up.
pub fn resolve(input: &str) -> Option<ResourceKind> {
  let input_lower = input.trim().to_lowercase();
  let mut ranked: Vec<(ResourceKind, u32)> = RESOURCES
    .iter()
    .filter_map(|res| rank(res, &input_lower).map(|r| (res.kind, r)))
    .collect();
  ranked.sort_by_key(|(_, r)| *r);

  match ranked.as_slice() {
    [(kind, _)] => Some(*kind),
    [(kind, best), (_, next), ..] if best < next => Some(*kind),
    _ => None,
  }
}

/// Match quality of `input` against a resource, 0 being an exact name match
fn rank(res: &ResourceName, input: &str) -> Option<u32> {
  if input.is_empty() {
    None
  } else if res.name == input {
    Some(0)
  } else if res.aliases.contains(&input) {
    Some(1)
  } else if res.name.starts_with(input) {
    Some(2)
  } else if res.aliases.iter().any(|a| a.starts_with(input)) {
    Some(3)
  } else if res.name.contains(input) {
    Some(4)
  } else if res.aliases.iter().any(|a| a.contains(input)) {
    Some(5)
  } else {
    None
  }
}
