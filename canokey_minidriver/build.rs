/* build.rs for driver canokey_minidriver */

fn main() {
    /* conditional compilation settings */
    println!("cargo:rustc-cfg=log"); // enables driver log output to the file set up from CANOKEY_MINIDRIVER_LOG_LEVEL/_DIR. Otherwise the driver will be quiet, whatever the environment says
}
