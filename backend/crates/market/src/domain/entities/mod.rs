pub mod bounty;
pub mod comment;
pub mod submission;

pub use bounty::{Bounty, BountyLimits, BountyPatch, BountyPatchInput, NewBounty};
pub use comment::Comment;
pub use submission::{
    NewSubmission, Submission, SubmissionPatch, SubmissionPatchInput, review_feedback,
};
