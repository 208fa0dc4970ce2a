/// Link and path cost. Lower is better, a route to yourself costs 0.
pub type Cost = u32;

/// Adds a neighbour's advertised cost to the link cost, saturating at [`Cost::MAX`]
///
/// # Examples
///
/// ```
/// assert_eq!(dvnet::util::path_cost(1, 2), 3);
/// assert_eq!(dvnet::util::path_cost(u32::MAX - 1, 5), u32::MAX);
/// ```
pub fn path_cost(link_cost: Cost, advertised: Cost) -> Cost {
    link_cost.saturating_add(advertised)
}
