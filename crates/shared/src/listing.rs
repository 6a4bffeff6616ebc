//! Category and text filters for the blog index.

use crate::{
    domain::BlogPost,
    protocol::{BlogListing, BlogQuery},
};

pub const ALL_CATEGORIES: &str = "All";

/// "All" followed by each distinct post category, in first-seen order.
pub fn post_categories(posts: &[BlogPost]) -> Vec<String> {
    let mut categories = vec![ALL_CATEGORIES.to_string()];
    for category in posts
        .iter()
        .filter_map(|post| post.category.as_deref())
        .filter(|category| !category.is_empty())
    {
        if !categories.iter().any(|known| known == category) {
            categories.push(category.to_string());
        }
    }
    categories
}

pub fn matches_category(post: &BlogPost, category: Option<&str>) -> bool {
    match category {
        None | Some(ALL_CATEGORIES) | Some("") => true,
        Some(wanted) => post.category.as_deref() == Some(wanted),
    }
}

/// Case-insensitive substring match over title and excerpt.
pub fn matches_search(post: &BlogPost, search: Option<&str>) -> bool {
    let Some(needle) = search.map(str::to_lowercase) else {
        return true;
    };
    post.title.to_lowercase().contains(&needle)
        || post
            .excerpt
            .as_deref()
            .is_some_and(|excerpt| excerpt.to_lowercase().contains(&needle))
}

pub fn build_listing(posts: Vec<BlogPost>, query: &BlogQuery) -> BlogListing {
    let categories = post_categories(&posts);
    let posts = posts
        .into_iter()
        .filter(|post| {
            matches_category(post, query.category.as_deref())
                && matches_search(post, query.search.as_deref())
        })
        .collect();
    BlogListing { categories, posts }
}
