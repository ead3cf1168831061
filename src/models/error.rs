/// Errors raised by the tally core.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TallyError {
    /// An update must count as either a mention or a post, never both or neither.
    #[error("ambiguous contribution for {name}: mention={mention}, post={post}")]
    AmbiguousContribution {
        name: String,
        mention: bool,
        post: bool,
    },
}
