//! Integration tests for detail-page extraction against a full page

use appstore_harvest::extract::{extract, ExtractError};

const DETAIL_PAGE: &str = include_str!("../fixtures/detail_page.html");

#[test]
fn test_full_detail_page_record() {
    let app = extract(DETAIL_PAGE).expect("fixture should extract");
    let record = &app.record;

    assert_eq!(record.app_id, "1121971067");
    assert_eq!(record.app_name, "Archery King");
    assert_eq!(record.price, "Free");
    assert_eq!(record.category, "Games");
    assert_eq!(record.published_date, "2017-08-30T07:00:00Z");
    assert_eq!(record.last_updated_date, "Aug 30, 2017");
    assert_eq!(record.version, "1.0.18");
    assert_eq!(record.size, "142 MB");
    assert_eq!(record.seller, "Miniclip SA");
    assert_eq!(record.copyright, "© 2016 Miniclip SA");
    assert_eq!(record.app_rating, "Rated 9+");
    assert_eq!(
        record.compatibility,
        "Requires iOS 7.0 or later. Compatible with iPhone, iPad, and iPod touch."
    );
    assert_eq!(
        record.description,
        "Become the Archery King!\nPlay 1-on-1 against players from around the world.\n\nFeatures:\n- Real-time multiplayer"
    );
}

#[test]
fn test_full_detail_page_ratings() {
    let record = extract(DETAIL_PAGE).unwrap().record;

    // star text only
    assert_eq!(record.current_version_rating_value, "4.5");
    assert_eq!(record.current_version_rating_count, "736");

    // direct numeric value wins over the star text
    assert_eq!(record.all_versions_rating_value, "4.40082");
    assert_eq!(record.all_versions_rating_count, "10312");
}

#[test]
fn test_full_detail_page_sub_records() {
    let app = extract(DETAIL_PAGE).unwrap();

    let languages: Vec<&str> = app.languages.iter().map(|l| l.language_name.as_str()).collect();
    assert_eq!(languages, vec!["English", "Arabic", "French"]);

    let purchases: Vec<(u32, &str, &str)> = app
        .purchases
        .iter()
        .map(|p| (p.order, p.title.as_str(), p.price.as_str()))
        .collect();
    assert_eq!(
        purchases,
        vec![
            (1, "Premium Golden Archery Pass", "$1.99"),
            (2, "Bag of Coins", "$4.99"),
            (3, "Chest of Gold", "$9.99"),
        ]
    );

    assert_eq!(app.reviews.len(), 2);
    assert_eq!(app.reviews[0].title, "Fun but tricky");
    assert_eq!(app.reviews[0].rating, "4");
    assert_eq!(app.reviews[0].user, "Bullseye Bob");
    assert_eq!(app.reviews[0].content, "Great aiming mechanics.\nWind takes some practice.");
    assert_eq!(app.reviews[1].rating, "1");
    assert_eq!(app.reviews[1].user, "Robin");

    assert!(app.languages.iter().all(|l| l.app_id == "1121971067"));
    assert!(app.reviews.iter().all(|r| r.app_id == "1121971067"));
}

#[test]
fn test_page_without_identity_marker() {
    let html = DETAIL_PAGE.replace("adam-id=\"1121971067\"", "");
    assert_eq!(
        extract(&html),
        Err(ExtractError::InvalidDocument {
            missing: "app identifier"
        })
    );
}

#[test]
fn test_page_with_sections_removed() {
    let start = DETAIL_PAGE.find("<div class=\"extra-list customer-ratings\">").unwrap();
    let end = DETAIL_PAGE.find("<div class=\"center-stack\">").unwrap();
    let html = format!("{}{}", &DETAIL_PAGE[..start], &DETAIL_PAGE[end..]);

    let app = extract(&html).unwrap();
    assert_eq!(app.record.current_version_rating_value, "");
    assert_eq!(app.record.all_versions_rating_count, "");
    assert!(app.purchases.is_empty());
    assert_eq!(app.reviews.len(), 2);
    assert_eq!(app.record.version, "1.0.18");
}

#[test]
fn test_unrated_current_version_keeps_all_versions_rating() {
    let start = DETAIL_PAGE
        .find("<div class=\"rating\" role=\"img\" tabindex=\"-1\" aria-label=\"4 and a half stars, 736 Ratings\">")
        .unwrap();
    let end = start + DETAIL_PAGE[start..].find("</div>").unwrap() + "</div>".len();
    let html = format!(
        "{}<span>This version has not received enough ratings.</span>{}",
        &DETAIL_PAGE[..start],
        &DETAIL_PAGE[end..]
    );

    let record = extract(&html).unwrap().record;
    assert_eq!(record.current_version_rating_value, "");
    assert_eq!(record.current_version_rating_count, "");
    assert_eq!(record.all_versions_rating_value, "4.40082");
    assert_eq!(record.all_versions_rating_count, "10312");
}
