//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod class_record;
pub mod consumption_record;
pub mod course_package;
pub mod session;
pub mod student;
pub mod student_course_package;
pub mod user;

// Re-export specific types to avoid conflicts
pub use class_record::{Column as ClassRecordColumn, Entity as ClassRecord, Model as ClassRecordModel};
pub use consumption_record::{
    Column as ConsumptionRecordColumn, Entity as ConsumptionRecord, Model as ConsumptionRecordModel,
};
pub use course_package::{
    Column as CoursePackageColumn, Entity as CoursePackage, Model as CoursePackageModel,
};
pub use session::{Column as SessionColumn, Entity as Session, Model as SessionModel};
pub use student::{Column as StudentColumn, Entity as Student, Model as StudentModel};
pub use student_course_package::{
    Column as StudentCoursePackageColumn, Entity as StudentCoursePackage,
    Model as StudentCoursePackageModel,
};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
