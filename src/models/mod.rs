pub mod exercise;
pub mod from_row;
pub mod user;
pub mod workout;

pub use exercise::{CreateExercise, Exercise};
pub use from_row::FromSqliteRow;
pub use user::{CreateUser, Credentials, UpdateUser, User, UserResponse};
pub use workout::{
    AddSets, CreateWorkout, SetPayload, UpdateWorkout, Workout, WorkoutDetail, WorkoutListItem,
    WorkoutSet,
};
