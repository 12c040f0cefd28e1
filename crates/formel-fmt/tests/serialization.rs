//! End-to-end serialization tests against reference renditions.
//!
//! The sources are deliberately dense (no spaces, mixed nesting); the
//! serializers must reproduce the canonical layout: braces on their
//! own lines, four-space indents, `;` after assignments and
//! conditionals in the surface form, colon blocks in the Python form.

use formel_fmt::{serialize_to_python, serialize_to_text};
use formel_parser::Ast;

const SOURCE_1: &str = "ЕСЛИ(x>(x+(1*4**3))){x=1;f=ABS(-5);}\
                        ИНАЧЕ_ЕСЛИ(25+(86+71*(23-23))){y=1;f=ABS(-5);}\
                        ИНАЧЕ{z=1;f=ABS(-5);};x=25;";

const SOURCE_2: &str = r"
ЕСЛИ(1)
{
    ЕСЛИ(2)
    {
        ЕСЛИ(3)
        {
            x = 1
            x = 1
            x = 1
        }
        ИНАЧЕ
        {
            ЕСЛИ(0)
            {
                y = 999
                y = 999
                y = 999
            }
            x = 2
            x = 2
            x = 2
        }
    }
    ИНАЧЕ
    {
        x = 3
        x = 3
        x = 3
    }
}
ИНАЧЕ
{
    x = 4
    x = 4
    x = 4
}
";

const REF_TEXT_1: &str = r"
ЕСЛИ (x > (x + (1 * 4 ** 3)))
{
    x = 1;
    f = ABS(-5);
}
ИНАЧЕ_ЕСЛИ (25 + (86 + 71 * (23 - 23)))
{
    y = 1;
    f = ABS(-5);
}
ИНАЧЕ
{
    z = 1;
    f = ABS(-5);
};
x = 25;
";

const REF_TEXT_2: &str = r"
ЕСЛИ (1)
{
    ЕСЛИ (2)
    {
        ЕСЛИ (3)
        {
            x = 1;
            x = 1;
            x = 1;
        }
        ИНАЧЕ
        {
            ЕСЛИ (0)
            {
                y = 999;
                y = 999;
                y = 999;
            };
            x = 2;
            x = 2;
            x = 2;
        };
    }
    ИНАЧЕ
    {
        x = 3;
        x = 3;
        x = 3;
    };
}
ИНАЧЕ
{
    x = 4;
    x = 4;
    x = 4;
};
";

const REF_PYTHON_1: &str = r"
if x > (x + (1 * 4 ** 3)):
    x = 1
    f = abs(-5)

elif 25 + (86 + 71 * (23 - 23)):
    y = 1
    f = abs(-5)

else:
    z = 1
    f = abs(-5)

x = 25
";

const REF_PYTHON_2: &str = r"
if 1:
    if 2:
        if 3:
            x = 1
            x = 1
            x = 1

        else:
            if 0:
                y = 999
                y = 999
                y = 999
            x = 2
            x = 2
            x = 2


    else:
        x = 3
        x = 3
        x = 3


else:
    x = 4
    x = 4
    x = 4
";

fn parse(source: &str) -> Ast {
    let stream = formel_lexer::analyze(source).expect("lexing should succeed");
    formel_parser::parse(stream).expect("parsing should succeed")
}

#[test]
fn text_rendition_of_dense_source() {
    assert_eq!(serialize_to_text(&parse(SOURCE_1)), REF_TEXT_1.trim());
}

#[test]
fn text_rendition_of_nested_source() {
    assert_eq!(serialize_to_text(&parse(SOURCE_2)), REF_TEXT_2.trim());
}

#[test]
fn python_rendition_of_dense_source() {
    assert_eq!(serialize_to_python(&parse(SOURCE_1)), REF_PYTHON_1.trim());
}

#[test]
fn python_rendition_of_nested_source() {
    assert_eq!(serialize_to_python(&parse(SOURCE_2)), REF_PYTHON_2.trim());
}

#[test]
fn surface_serialization_is_idempotent() {
    for source in [SOURCE_1, SOURCE_2, "x = 1; y = x + 2;", "1.75 and 2.34"] {
        let once = serialize_to_text(&parse(source));
        let twice = serialize_to_text(&parse(&once));
        assert_eq!(once, twice, "{source}");
    }
}

#[test]
fn python_rendition_is_stable_across_roundtrip() {
    for source in [SOURCE_1, SOURCE_2] {
        let direct = serialize_to_python(&parse(source));
        let through_text = serialize_to_python(&parse(&serialize_to_text(&parse(source))));
        assert_eq!(direct, through_text, "{source}");
    }
}
