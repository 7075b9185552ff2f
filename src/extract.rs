use serde::Serialize;
use serde_json::Value;
use tracing::warn;

const BLOCK_START: &str = "<JSON_OUTPUT>";
const BLOCK_END: &str = "</JSON_OUTPUT>";

/// A link the model recommends alongside its reply.
#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct RecommendedLink {
    pub title: String,
    pub url: String,
    pub description: String,
}

/// Machine-readable payload the model embeds between sentinel markers.
/// Both fields default when the block is absent or malformed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StructuredOutput {
    pub details_required: bool,
    pub links: Vec<RecommendedLink>,
}

/// Parse the first sentinel-delimited JSON block out of a reply.
///
/// The reply itself is never modified; a missing block, unparsable JSON and
/// malformed sub-fields all degrade to the defaults. Pure, so parsing the
/// same reply twice yields identical output.
pub fn extract_structured_output(reply: &str) -> StructuredOutput {
    let Some(block) = sentinel_block(reply) else {
        return StructuredOutput::default();
    };

    let parsed: Value = match serde_json::from_str(block.trim()) {
        Ok(parsed) => parsed,
        Err(err) => {
            warn!("Could not parse JSON_OUTPUT block: {}", err);
            return StructuredOutput::default();
        }
    };

    StructuredOutput {
        details_required: parsed["detailsRequired"].as_bool().unwrap_or(false),
        links: links_from(&parsed),
    }
}

/// The text between the first start marker and the first end marker after
/// it. Spans newlines; no marker pair means no block.
fn sentinel_block(reply: &str) -> Option<&str> {
    let start = reply.find(BLOCK_START)? + BLOCK_START.len();
    let end = reply[start..].find(BLOCK_END)? + start;
    Some(&reply[start..end])
}

/// The flat `links` array is canonical; when it is missing, the categorized
/// variant (`categories[].links`) is flattened in order. Elements that are
/// not objects are dropped.
fn links_from(parsed: &Value) -> Vec<RecommendedLink> {
    if let Some(links) = parsed["links"].as_array() {
        return collect_links(links);
    }

    if let Some(categories) = parsed["categories"].as_array() {
        return categories
            .iter()
            .filter_map(|category| category["links"].as_array())
            .flat_map(|links| collect_links(links))
            .collect();
    }

    Vec::new()
}

fn collect_links(values: &[Value]) -> Vec<RecommendedLink> {
    values
        .iter()
        .filter(|value| value.is_object())
        .map(|value| RecommendedLink {
            title: string_field(value, "title"),
            url: string_field(value, "url"),
            description: string_field(value, "description"),
        })
        .collect()
}

fn string_field(value: &Value, field: &str) -> String {
    value[field].as_str().unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_links_and_flag_from_delimited_block() {
        let reply = "Sure! Here are some options.\n<JSON_OUTPUT>{\"detailsRequired\":true,\
            \"links\":[{\"title\":\"Courses\",\"url\":\"https://example.com/courses\",\
            \"description\":\"All courses\"}],\"categorized\":false}</JSON_OUTPUT>";

        let output = extract_structured_output(reply);
        assert!(output.details_required);
        assert_eq!(output.links.len(), 1);
        assert_eq!(output.links[0].title, "Courses");
        assert_eq!(output.links[0].url, "https://example.com/courses");
    }

    #[test]
    fn block_may_span_newlines() {
        let reply = "Hi\n<JSON_OUTPUT>\n{\n  \"detailsRequired\": false,\n  \"links\": []\n}\n</JSON_OUTPUT>\nBye";
        let output = extract_structured_output(reply);
        assert!(!output.details_required);
        assert!(output.links.is_empty());
    }

    #[test]
    fn only_the_first_block_is_parsed() {
        let reply = "<JSON_OUTPUT>{\"detailsRequired\":true,\"links\":[]}</JSON_OUTPUT>\
            <JSON_OUTPUT>{\"detailsRequired\":false,\"links\":[{\"title\":\"x\"}]}</JSON_OUTPUT>";
        let output = extract_structured_output(reply);
        assert!(output.details_required);
        assert!(output.links.is_empty());
    }

    #[test]
    fn missing_block_yields_defaults() {
        let output = extract_structured_output("Just a plain reply.");
        assert_eq!(output, StructuredOutput::default());
    }

    #[test]
    fn invalid_json_yields_same_defaults_as_missing_block() {
        let output = extract_structured_output("<JSON_OUTPUT>{not json]</JSON_OUTPUT>");
        assert_eq!(output, StructuredOutput::default());
    }

    #[test]
    fn extraction_is_idempotent() {
        let reply = "<JSON_OUTPUT>{\"detailsRequired\":true,\
            \"links\":[{\"title\":\"a\",\"url\":\"https://a\",\"description\":\"\"}]}</JSON_OUTPUT>";
        assert_eq!(
            extract_structured_output(reply),
            extract_structured_output(reply)
        );
    }

    #[test]
    fn missing_subfields_default_to_empty_and_false() {
        let reply = "<JSON_OUTPUT>{\"links\":[{\"title\":\"only title\"}]}</JSON_OUTPUT>";
        let output = extract_structured_output(reply);
        assert!(!output.details_required);
        assert_eq!(output.links[0].title, "only title");
        assert_eq!(output.links[0].url, "");
        assert_eq!(output.links[0].description, "");
    }

    #[test]
    fn non_boolean_details_flag_defaults_to_false() {
        let reply = "<JSON_OUTPUT>{\"detailsRequired\":\"yes\",\"links\":[]}</JSON_OUTPUT>";
        assert!(!extract_structured_output(reply).details_required);
    }

    #[test]
    fn wrong_typed_subfields_default_instead_of_dropping_the_link() {
        let reply = "<JSON_OUTPUT>{\"links\":[{\"title\":42,\"url\":\"https://a\"}]}</JSON_OUTPUT>";
        let output = extract_structured_output(reply);
        assert_eq!(output.links.len(), 1);
        assert_eq!(output.links[0].title, "");
        assert_eq!(output.links[0].url, "https://a");
    }

    #[test]
    fn non_object_link_elements_are_dropped() {
        let reply = "<JSON_OUTPUT>{\"links\":[\"junk\",{\"title\":\"ok\"},42]}</JSON_OUTPUT>";
        let output = extract_structured_output(reply);
        assert_eq!(output.links.len(), 1);
        assert_eq!(output.links[0].title, "ok");
    }

    #[test]
    fn categorized_variant_is_flattened_in_order() {
        let reply = "<JSON_OUTPUT>{\"detailsRequired\":false,\"categorized\":true,\
            \"categories\":[\
              {\"name\":\"Courses\",\"links\":[{\"title\":\"a\"},{\"title\":\"b\"}]},\
              {\"name\":\"News\",\"links\":[{\"title\":\"c\"}]}\
            ]}</JSON_OUTPUT>";
        let output = extract_structured_output(reply);
        let titles: Vec<&str> = output.links.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b", "c"]);
    }

    #[test]
    fn flat_links_win_over_categories_when_both_present() {
        let reply = "<JSON_OUTPUT>{\"links\":[{\"title\":\"flat\"}],\
            \"categories\":[{\"links\":[{\"title\":\"nested\"}]}]}</JSON_OUTPUT>";
        let output = extract_structured_output(reply);
        assert_eq!(output.links.len(), 1);
        assert_eq!(output.links[0].title, "flat");
    }
}
