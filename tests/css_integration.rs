
use fixtures::{css, default_options, sass};
use zencode::{expand, ColorCase, Mode};

#[test]
fn test_margin_shortcut() {
    assert_eq!(css("m10"), "margin: 10px;");
}

#[test]
fn test_auto_vendor_prefixes() {
    assert_eq!(
        css("-bdrs5"),
        "-webkit-border-radius: 5px;\n-moz-border-radius: 5px;\nborder-radius: 5px;"
    );
}

#[test]
fn test_color_shortened_lowercase() {
    assert_eq!(css("c#f.5"), "color: #fff;");
}

#[test]
fn test_multi_value_arguments() {
    assert_eq!(css("m10-20"), "margin: 10px 20px;");
    assert_eq!(css("m0-a"), "margin: 0px auto;");
}

#[test]
fn test_multiple_properties() {
    assert_eq!(
        css("w100p+h50p+fl:l"),
        "width: 100%;\nheight: 50%;\nfloat: left;"
    );
}

#[test]
fn test_float_unit_default() {
    assert_eq!(css("lh1.5+fz1.2"), "line-height: 1.5;\nfont-size: 1.2em;");
}

#[test]
fn test_important() {
    assert_eq!(css("d:n!"), "display: none !important;");
}

#[test]
fn test_rgb_color() {
    assert_eq!(css("c#fc0rgb"), "color: rgb(255,204,0);");
}

#[test]
fn test_border_shorthand_with_trailing_alias() {
    assert_eq!(css("bd1-#2s"), "border: 1px #222 solid;");
}

#[test]
fn test_color_case_upper() {
    let mut options = default_options();
    options.color_case = ColorCase::Upper;
    assert_eq!(
        expand("c#abc", Mode::Css, &options).unwrap(),
        "color: #ABC;"
    );
}

#[test]
fn test_unknown_key_generic_rendering() {
    assert_eq!(css("grid-area2"), "grid-area: 2px;");
}

#[test]
fn test_sass_mode() {
    assert_eq!(sass("m10+p5"), "margin: 10px\npadding: 5px");
    assert_eq!(sass("@mi button"), "@mixin button");
}

#[test]
fn test_determinism() {
    assert_eq!(css("m10+p20-30+c#f"), css("m10+p20-30+c#f"));
}
