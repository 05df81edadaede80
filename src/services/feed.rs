// SPDX-License-Identifier: MIT

//! Feed assembly: ordering retrieved posts for presentation.

use crate::models::Post;

/// Order posts by `created` descending, most recent first.
///
/// The sort is stable, so posts with equal timestamps keep their original
/// (insertion) order. Re-running assembly on the same input always produces
/// the same sequence.
pub fn assemble(mut posts: Vec<Post>) -> Vec<Post> {
    posts.sort_by(|a, b| b.created.cmp(&a.created));
    posts
}

/// Remove the first post with the given id from an assembled feed.
///
/// The ordering of the remaining entries is untouched. Returns whether a
/// matching entry was found.
pub fn remove(posts: &mut Vec<Post>, id: &str) -> bool {
    match posts.iter().position(|p| p.id == id) {
        Some(index) => {
            posts.remove(index);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(id: &str, created: i64) -> Post {
        Post {
            id: id.to_string(),
            author: "user-1".to_string(),
            media: "media-1".to_string(),
            created,
            expires: None,
            description: String::new(),
        }
    }

    fn ids(posts: &[Post]) -> Vec<&str> {
        posts.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_orders_most_recent_first() {
        // Inserted out of order on purpose.
        let posts = vec![post("t2", 200), post("t3", 300), post("t1", 100)];

        let feed = assemble(posts);
        assert_eq!(ids(&feed), ["t3", "t2", "t1"]);
    }

    #[test]
    fn test_equal_timestamps_keep_insertion_order() {
        let posts = vec![post("a", 100), post("b", 100), post("c", 100)];

        let feed = assemble(posts);
        assert_eq!(ids(&feed), ["a", "b", "c"]);
    }

    #[test]
    fn test_assembly_is_reproducible() {
        let posts = vec![post("a", 200), post("b", 100), post("c", 200)];

        let first = assemble(posts.clone());
        let second = assemble(posts);
        assert_eq!(ids(&first), ids(&second));
    }

    #[test]
    fn test_remove_keeps_remaining_order() {
        let mut feed = assemble(vec![post("a", 300), post("b", 200), post("c", 100)]);

        assert!(remove(&mut feed, "b"));
        assert_eq!(ids(&feed), ["a", "c"]);

        assert!(!remove(&mut feed, "b"));
        assert_eq!(ids(&feed), ["a", "c"]);
    }
}
