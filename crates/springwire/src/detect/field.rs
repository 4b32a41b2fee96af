use crate::java::position::PositionLocator;
use crate::model::{AnnotationKind, ClassInfo, FieldInfo, InjectionInfo, InjectionKind};
use crate::Position;

use super::InjectionDetector;

/// `@Autowired` fields.
///
/// With source text attached, each position is refined to the declaration
/// line that follows the `@Autowired` line.
#[derive(Debug, Clone, Default)]
pub struct FieldInjectionDetector<'s> {
    locator: Option<PositionLocator<'s>>,
}

impl<'s> FieldInjectionDetector<'s> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(source: &'s str) -> Self {
        Self {
            locator: Some(PositionLocator::new(source)),
        }
    }

    fn refined_position(&self, field: &FieldInfo) -> Option<Position> {
        let locator = self.locator.as_ref()?;
        // Only look inside the field declaration's own lines.
        let first = field.range.start.line.checked_sub(1)? as usize;
        let last = field.range.end.line as usize;
        let lines = locator.lines();
        let autowired = (first..last.min(lines.len()))
            .find(|&idx| lines[idx].contains("@Autowired"))?;
        (autowired + 1..last.min(lines.len())).find_map(|idx| {
            word_offset(lines[idx], &field.name)
                .map(|col| Position::new((idx + 1) as u32, (col + 1) as u32))
        })
    }
}

/// Byte offset of `word` in `line` where it is not part of a longer identifier.
fn word_offset(line: &str, word: &str) -> Option<usize> {
    let is_ident = |c: char| c.is_alphanumeric() || c == '_' || c == '$';
    line.match_indices(word).map(|(idx, _)| idx).find(|&idx| {
        let before = line[..idx].chars().next_back();
        let after = line[idx + word.len()..].chars().next();
        !before.is_some_and(is_ident) && !after.is_some_and(is_ident)
    })
}

impl InjectionDetector for FieldInjectionDetector<'_> {
    fn detect(&self, classes: &[ClassInfo]) -> Vec<InjectionInfo> {
        let mut injections = Vec::new();
        for class in classes {
            for field in &class.fields {
                if !field.has_annotation(AnnotationKind::Autowired) {
                    continue;
                }
                let position = self.refined_position(field).unwrap_or(field.position);
                injections.push(
                    InjectionInfo::new(
                        InjectionKind::Field,
                        class,
                        field.field_type.clone(),
                        field.name.clone(),
                        position,
                        field.range,
                    )
                    .with_qualifier(field.qualifier()),
                );
            }
        }
        injections
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::test_support::classes;

    const SOURCE: &str = r#"package a;

@Service
public class NotificationService {
    @Autowired
    private UserRepository userRepository;

    private Clock clock;

    @Autowired
    @Qualifier("smtp")
    private MailSender mailSender;

    @Autowired private UnknownType unknownType;
}
"#;

    #[test]
    fn detects_autowired_fields_in_order() {
        let injections = FieldInjectionDetector::new().detect(&classes(SOURCE));
        let names: Vec<_> = injections.iter().map(|i| i.target_name.as_str()).collect();
        assert_eq!(names, vec!["userRepository", "mailSender", "unknownType"]);
        assert!(injections
            .iter()
            .all(|i| i.injection_kind == InjectionKind::Field));
        assert_eq!(injections[0].target_type, "UserRepository");
        assert_eq!(injections[0].owner_class, "a.NotificationService");
    }

    #[test]
    fn carries_qualifier() {
        let injections = FieldInjectionDetector::new().detect(&classes(SOURCE));
        assert_eq!(injections[0].qualifier, None);
        assert_eq!(injections[1].qualifier.as_deref(), Some("smtp"));
        assert_eq!(injections[1].name_hint(), "smtp");
        assert_eq!(injections[0].name_hint(), "userRepository");
    }

    #[test]
    fn refines_position_to_declaration_line() {
        let detector = FieldInjectionDetector::with_source(SOURCE);
        let injections = detector.detect(&classes(SOURCE));
        assert_eq!(injections[0].position, Position::new(6, 28));
        assert_eq!(injections[1].position.line, 12);
        assert_eq!(injections[2].position, Position::new(14, 36));
    }

    #[test]
    fn word_offset_ignores_partial_matches() {
        assert_eq!(word_offset("    private Rate rate;", "rate"), Some(17));
        assert_eq!(word_offset("    private Ratelimit ratelimiter;", "rate"), None);
    }

    #[test]
    fn no_autowired_fields_means_no_injections() {
        let source = "class A { private Foo foo; @Value(\"x\") private String s; }";
        assert!(FieldInjectionDetector::new().detect(&classes(source)).is_empty());
    }
}
