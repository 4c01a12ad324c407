use a3c_core::record::Record;

/// Message sent from an actor-learner to the coordinator at the end of every episode.
pub struct EpisodeMessage {
    /// Id of the actor-learner.
    pub id: usize,

    /// Episode statistics and the losses of the last update.
    pub record: Record,
}
