// quotation-pdf: navbar and footer shown around the interactive session

use crate::config::BusinessIdentity;

const LINKS: [&str; 4] = ["Home", "About", "Services", "Contact Us"];
const RULE_WIDTH: usize = 64;

pub fn navbar(business: &BusinessIdentity) -> String {
    let rule = "═".repeat(RULE_WIDTH);
    format!(
        "{rule}\n [{initials}]  {name}\n       {tagline}\n{rule}",
        initials = business.initials(),
        name = business.name,
        tagline = business.tagline,
    )
}

pub fn footer(business: &BusinessIdentity, year: i32) -> String {
    let rule = "─".repeat(RULE_WIDTH);
    format!(
        "{rule}\n{links}\n{address}\n{email} | {phone}\n© {year} {name}. All rights reserved.",
        links = LINKS.join("  ·  "),
        address = business.address,
        email = business.email,
        phone = business.phone,
        name = business.name,
    )
}
