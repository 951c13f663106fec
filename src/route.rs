/// Combines a controller's base route with a method's route fragment into one
/// normalized path.
///
/// The two fragments are joined with a single `/`; any run of slashes collapses
/// to one, and leading and trailing slashes are stripped. An empty result means
/// the method resolves to the bare root, which the synthesizer discards.
///
/// # Example
///
/// ```
/// use apidoc_from_source::route::resolve;
///
/// assert_eq!(resolve("/categories/", "/:id/children"), "categories/:id/children");
/// ```
pub fn resolve(base_route: &str, method_route: &str) -> String {
    let joined = format!("{}/{}", base_route, method_route);

    let mut normalized = String::with_capacity(joined.len());
    let mut last_was_slash = false;
    for c in joined.chars() {
        if c == '/' {
            if !last_was_slash {
                normalized.push('/');
            }
            last_was_slash = true;
        } else {
            normalized.push(c);
            last_was_slash = false;
        }
    }

    normalized
        .trim_start_matches('/')
        .trim_end_matches('/')
        .to_string()
}
