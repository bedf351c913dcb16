use super::tree::Variable;

/// Represents the contents of a single tag.
pub enum Fragment {
    /// A scalar directive - `{{ order.total }}`.
    Output(Variable),
    /// The opening tag of a repetition block - `{{#each items}}`.
    Each(Variable),
    /// The closing tag of a repetition block - `{{/each}}`.
    EndEach,
}
