pub mod comment;
pub mod follow;
pub mod post;
pub mod user;
pub mod vote;

pub use comment::{Entity as Comment, Model as CommentModel};
pub use follow::{Entity as Follow, Model as FollowModel};
pub use post::{Entity as Post, Model as PostModel};
pub use user::{Entity as User, Model as UserModel};
pub use vote::{Entity as Vote, Model as VoteModel};
