//! Pagination envelope tests

use critique::pagination::{Page, PageQuery, COMMENT_PAGE_SIZE, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

#[test]
fn test_first_page_has_no_previous_link() {
    let page = Page::new("/api/v1/titles", 1, 10, 25, vec![1, 2, 3]);

    assert_eq!(page.count, 25);
    assert!(page.previous.is_none());
    let next = page.next.expect("25 rows at size 10 have a page 2");
    assert!(next.contains("page=2"));
    assert!(next.starts_with("/api/v1/titles?"));
}

#[test]
fn test_last_page_has_no_next_link() {
    let page = Page::new("/api/v1/titles", 3, 10, 25, vec![1, 2, 3, 4, 5]);

    assert!(page.next.is_none());
    let previous = page.previous.expect("page 3 has a page 2 behind it");
    assert!(previous.contains("page=2"));
}

#[test]
fn test_empty_result_set_has_no_links() {
    let page: Page<i32> = Page::new("/api/v1/genres", 1, 10, 0, Vec::new());

    assert_eq!(page.count, 0);
    assert!(page.next.is_none());
    assert!(page.previous.is_none());
}

#[test]
fn test_page_query_defaults_and_clamping() {
    let defaults = PageQuery {
        page: None,
        page_size: None,
    };
    assert_eq!(defaults.page(), 1);
    assert_eq!(defaults.size(), DEFAULT_PAGE_SIZE);

    let oversized = PageQuery {
        page: Some(0),
        page_size: Some(100_000),
    };
    assert_eq!(oversized.page(), 1, "page is 1-based");
    assert_eq!(oversized.size(), MAX_PAGE_SIZE);
}

#[test]
fn test_comment_page_size_is_fixed() {
    // Comment listings always use the configured size; an exact
    // multiple of it lands on a clean last page.
    let page: Page<i32> = Page::new(
        "/api/v1/titles/1/reviews/2/comments",
        2,
        COMMENT_PAGE_SIZE,
        COMMENT_PAGE_SIZE * 2,
        Vec::new(),
    );
    assert!(page.next.is_none());
    assert!(page.previous.is_some());
}
