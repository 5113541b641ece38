//! Built-in sample documents.
//!
//! A fictional three-area site inspection and its thermal survey, already
//! converted to plain text. `ddr demo` runs these, and the end-to-end tests use
//! them as the known-good baseline. The survey repeats one image on purpose so
//! a demo run shows a suppressed duplicate.

use ddr_contracts::extraction::SourceDocuments;

pub const INSPECTION: &str = "\
Detailed Site Inspection Report
Inspection Date: 12/03/2024
Inspected By: Site Engineer
Property Type: Flat

Impacted Area 1
Negative side Description
Hall Skirting level dampness observed along the east wall
Negative side photographs
Photo 1 Photo 2
Positive side Description
Common Bathroom tile hollowness and open tile joints
Positive side photographs
Photo 3 Photo 4

Impacted Area 2
Negative side Description
Bedroom 1 skirting dampness and paint spalling
Negative side photographs
Photo 5
Positive side Description
MB Bathroom tile joints open near the shower area
Positive side photographs
Photo 6

Impacted Area 3
Negative side Description
Kitchen seepage below the sink counter
Negative side photographs
Photo 7
Positive side Description
Balcony outlet choked, water stagnation near the drain
Positive side photographs
Photo 8

Additional Notes
Hall: Paint peeling near the window frame
Terrace: Hairline cracks on the parapet wall
";

pub const THERMAL: &str = "\
Thermal Imaging Survey
Camera: FLIR E8

Image ID: RB02380X.JPG
Hotspot: 31.2 °C
Coldspot: 24.1 °C
Temperature Difference: 7.1 °C

Image ID: RB02381X.JPG
Hotspot: 27.4 °C
Coldspot: 25.0 °C
Temperature Difference: 2.4 °C

Image ID: RB02382X.JPG
Hotspot Temperature: 29.8 °C
Coldspot Temperature: 23.6 °C
Difference: 6.2 °C

Image ID: RB02381X.JPG
Hotspot: 27.6 °C
Coldspot: 25.1 °C
Temperature Difference: 2.5 °C
";

/// The sample pair as pipeline input.
pub fn documents() -> SourceDocuments {
    SourceDocuments::new(INSPECTION, THERMAL)
}
