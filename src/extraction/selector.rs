use chrono::{Days, NaiveDate};

use crate::{
    constants::{IMAP_DATE_FORMAT, INBOX, ISO_DATE_FORMAT},
    error::{ExtractError, Result},
    utils::utils_mailbox::MailStore,
};

use super::models::{MessageHandle, RawCriteria, SearchCriteria};

/// Accepts `2024-01-31` or `31-Jan-2024`.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let trimmed = input.trim();
    NaiveDate::parse_from_str(trimmed, ISO_DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(trimmed, IMAP_DATE_FORMAT))
        .map_err(|_| ExtractError::DateParse {
            input: input.to_string(),
        })
}

impl RawCriteria {
    // Start/end ordering is not checked; an inverted range simply matches
    // nothing on the server.
    pub fn parse(&self) -> Result<SearchCriteria> {
        Ok(SearchCriteria {
            sender: self.sender.trim().to_string(),
            start_date: parse_date(&self.start_date)?,
            end_date: parse_date(&self.end_date)?,
        })
    }
}

impl SearchCriteria {
    /// SEARCH `BEFORE` is exclusive, so the inclusive end date moves one day on.
    pub fn before_date(&self) -> Result<NaiveDate> {
        self.end_date
            .checked_add_days(Days::new(1))
            .ok_or_else(|| ExtractError::DateParse {
                input: self.end_date.to_string(),
            })
    }

    pub fn to_search_query(&self) -> Result<String> {
        Ok(format!(
            "FROM {} SINCE \"{}\" BEFORE \"{}\"",
            quote(&self.sender),
            self.start_date.format(IMAP_DATE_FORMAT),
            self.before_date()?.format(IMAP_DATE_FORMAT),
        ))
    }
}

fn quote(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

pub fn select_inbox(store: &mut dyn MailStore) -> Result<()> {
    store.select(INBOX)
}

/// Handles of every message in the selected mailbox matching `criteria`.
pub fn search_messages(
    store: &mut dyn MailStore,
    criteria: &SearchCriteria,
) -> Result<Vec<MessageHandle>> {
    let query = criteria.to_search_query()?;
    tracing::debug!(%query, "Searching mailbox");
    store.search(&query)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn criteria(sender: &str, start: &str, end: &str) -> SearchCriteria {
        RawCriteria {
            sender: sender.to_string(),
            start_date: start.to_string(),
            end_date: end.to_string(),
        }
        .parse()
        .unwrap()
    }

    #[test]
    fn parses_both_date_layouts() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(parse_date("2024-01-05").unwrap(), expected);
        assert_eq!(parse_date("05-Jan-2024").unwrap(), expected);
        assert_eq!(parse_date(" 2024-01-05 ").unwrap(), expected);
    }

    #[test]
    fn malformed_date_is_date_parse_error() {
        for bad in ["", "2024-13-01", "yesterday", "2024/01/05"] {
            assert!(matches!(
                parse_date(bad),
                Err(ExtractError::DateParse { .. })
            ));
        }
    }

    #[test]
    fn before_bound_is_end_plus_one_day() {
        let c = criteria("a@b.com", "2024-01-01", "2024-01-31");
        assert_eq!(
            c.before_date().unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()
        );

        let leap = criteria("a@b.com", "2024-02-01", "2024-02-28");
        assert_eq!(
            leap.before_date().unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );

        let new_year = criteria("a@b.com", "2023-12-01", "2023-12-31");
        assert_eq!(
            new_year.before_date().unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
    }

    #[test]
    fn builds_imap_search_query() {
        let c = criteria("a@b.com", "2024-01-01", "2024-01-31");
        assert_eq!(
            c.to_search_query().unwrap(),
            r#"FROM "a@b.com" SINCE "01-Jan-2024" BEFORE "01-Feb-2024""#
        );
    }

    #[test]
    fn sender_quotes_are_escaped() {
        let c = criteria("\"Billing\" <x@y.z>", "2024-03-09", "2024-03-09");
        assert_eq!(
            c.to_search_query().unwrap(),
            r#"FROM "\"Billing\" <x@y.z>" SINCE "09-Mar-2024" BEFORE "10-Mar-2024""#
        );
    }

    #[test]
    fn inverted_range_is_passed_through() {
        let c = criteria("a@b.com", "2024-02-01", "2024-01-01");
        assert_eq!(
            c.to_search_query().unwrap(),
            r#"FROM "a@b.com" SINCE "01-Feb-2024" BEFORE "02-Jan-2024""#
        );
    }
}
